//! Entity and attribute names of the CRM schema.

pub mod incident {
    pub const ENTITY: &str = "incident";
    pub const ID: &str = "incidentid";
    pub const TICKET_NUMBER: &str = "ticketnumber";
    pub const CREATED_ON: &str = "createdon";
    pub const MODIFIED_ON: &str = "modifiedon";
    pub const STATUS_CODE: &str = "statuscode";
    pub const PRIORITY_CODE: &str = "prioritycode";
    pub const RESOLVE_BY: &str = "resolveby";
    pub const DESCRIPTION: &str = "new_description";
    pub const CHANNEL: &str = "new_ticketsubmissionchannel";
    pub const DEPARTMENT: &str = "new_businessunitid";
    pub const CREATED_BY: &str = "createdby";
    pub const MODIFIED_BY: &str = "modifiedby";
    pub const OWNER: &str = "ownerid";
    pub const CUSTOMER: &str = "customerid";
    pub const TICKET_TYPE: &str = "new_tickettype";
    pub const MAIN_CLASSIFICATION: &str = "new_mainclassification";
    pub const SUB_CLASSIFICATION: &str = "new_subclassificationitem";
    pub const IS_REOPENED: &str = "new_isreopened";
    pub const REOPENED_ON: &str = "new_reopendatetime";
    pub const REOPEN_COUNT: &str = "new_reopencount";
    pub const MINERAL_CLASS: &str = "new_class";
    pub const ASSIGNMENT_SUCCEEDED_ON: &str = "new_assignmentsucceededon";
    pub const PROCESSING_SUCCEEDED_ON: &str = "new_processingsucceededon";
    pub const VERIFICATION_SUCCEEDED_ON: &str = "new_solutionverificationsucceededon";

    pub const APPROVAL_VIOLATIONS: [&str; 3] = [
        "new_assignmentslaviolationl1",
        "new_assignmentslaviolationl2",
        "new_assignmentslaviolationl3",
    ];
    pub const PROCESSING_VIOLATIONS: [&str; 4] = [
        "new_slaviolationl1",
        "new_slaviolationl2",
        "new_slaviolationl3",
        "new_slaviolationl4",
    ];
    pub const VERIFICATION_VIOLATIONS: [&str; 3] = [
        "new_verificationslaviolationl1",
        "new_verificationslaviolationl2",
        "new_verificationslaviolationl3",
    ];

    /// Columns the case reports project.
    pub fn report_columns() -> Vec<&'static str> {
        let mut cols = vec![
            TICKET_NUMBER,
            CREATED_ON,
            MODIFIED_ON,
            STATUS_CODE,
            PRIORITY_CODE,
            RESOLVE_BY,
            DESCRIPTION,
            CHANNEL,
            DEPARTMENT,
            CREATED_BY,
            MODIFIED_BY,
            OWNER,
            CUSTOMER,
            TICKET_TYPE,
            MAIN_CLASSIFICATION,
            SUB_CLASSIFICATION,
            IS_REOPENED,
            REOPENED_ON,
            REOPEN_COUNT,
            MINERAL_CLASS,
            ASSIGNMENT_SUCCEEDED_ON,
            PROCESSING_SUCCEEDED_ON,
            VERIFICATION_SUCCEEDED_ON,
        ];
        cols.extend(APPROVAL_VIOLATIONS);
        cols.extend(PROCESSING_VIOLATIONS);
        cols.extend(VERIFICATION_VIOLATIONS);
        cols
    }
}

pub mod account {
    pub const ENTITY: &str = "account";
    pub const ID: &str = "accountid";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "emailaddress1";
    pub const TELEPHONE: &str = "telephone1";
    pub const REPRESENTATIVE_PHONE: &str = "new_companyrepresentativephonenumber";
    pub const STATUS_CODE: &str = "statuscode";
    pub const CREATED_ON: &str = "createdon";
}

pub mod contact {
    pub const ENTITY: &str = "contact";
    pub const ID: &str = "contactid";
    pub const FIRST_NAME: &str = "firstname";
    pub const LAST_NAME: &str = "lastname";
    pub const FULL_NAME: &str = "fullname";
    pub const EMAIL: &str = "emailaddress1";
    pub const MOBILE: &str = "mobilephone";
    /// Lookup to the contact's parent account.
    pub const COMPANY: &str = "new_companyname";
    pub const STATUS_CODE: &str = "statuscode";
    pub const CREATED_ON: &str = "createdon";
}

/// Shared by account and contact.
pub const CR_NUMBER: &str = "new_crnumber";

pub mod sla_kpi {
    pub const ENTITY: &str = "slakpiinstance";
    pub const NAME: &str = "name";
    pub const FAILURE_TIME: &str = "failuretime";
    pub const SUCCEEDED_ON: &str = "succeededon";
    pub const REGARDING: &str = "regarding";
}

pub mod case_survey {
    pub const ENTITY: &str = "new_customersatisfactionscore";
    pub const CASE: &str = "new_csatcase";
    pub const CUSTOMER: &str = "new_customer";
    pub const RATING: &str = "new_customersatisfactionrating";
    pub const SCORE_TEXT: &str = "new_customersatisfactionscore";
    pub const TIME_APPROPRIATE: &str = "new_wasthetimetakentoprocesstheticketappropri";
    pub const COMMENT: &str = "new_comment";
    pub const CREATED_ON: &str = "createdon";
}

pub mod visitor {
    pub const ENTITY: &str = "new_visitor";
    pub const ID: &str = "new_visitorid";
    pub const NUMBER: &str = "new_visitornumber";
    pub const CONTACT: &str = "new_contactname";
    pub const ACCOUNT: &str = "new_companyname";
    pub const PURPOSE: &str = "new_purposeofvisit";
    pub const ACTION: &str = "new_actiontake";
    pub const CATEGORY: &str = "new_category";
    pub const BRANCH: &str = "new_branch";
    pub const CREATED_ON: &str = "createdon";
    pub const MODIFIED_ON: &str = "modifiedon";
}

pub mod visitor_survey {
    pub const ENTITY: &str = "new_satisfactionsurveysms";
    pub const VISITOR: &str = "new_satisfactionsurveyvisitor";
    pub const CONTACT: &str = "new_satisfactionsurveycontact";
    pub const COMPANY: &str = "new_satisfactionsurveycompany";
    pub const SERVICE: &str = "new_howsatisfiedareyouwiththeserviceprovideda";
    pub const EFFICIENCY: &str = "new_howsatisfiedareyouwiththeefficiencyofthes";
    pub const REASONS: &str = "new_helpusbetterunderstandwhyyouchosetovisitt";
    pub const OPINION: &str = "new_youropinionmatterstouspleaseshareyourcom";
    pub const NAME: &str = "new_name";
    pub const CREATED_ON: &str = "createdon";
}

pub mod ki_survey {
    pub const ENTITY: &str = "new_satisfactionsurvey";
    pub const TICKET: &str = "new_ticket";
    pub const COMPANY: &str = "new_company";
    pub const CONTACT: &str = "new_contact";
    pub const SURVEY_TEXT: &str = "new_satisfactionsurvey";
    pub const SUGGESTIONS: &str = "new_doyouhaveanyothersuggestionsandorcomments";
    pub const TIME_APPROPRIATE: &str = "new_howsatisfiedareyouwiththetimetakentoresol";
}

pub mod investor_survey {
    pub const ENTITY: &str = "new_communicationsatisfactionsurvey";
    pub const COMMUNICATION: &str = "new_keyinvestorcommunication";
    pub const CONTACT: &str = "new_communicationsatisfactionsurvey_contact";
    pub const ACCOUNT: &str = "new_communicationsatisfactionsurvey_account";
    pub const OVERALL: &str = "new_overallhowsatisfiedareyouwithyourexperien";
    pub const RESPONSIVENESS: &str = "new_howsatisfiedareyouwiththeresponsivenessof";
    pub const PROFESSIONALISM: &str = "new_howsatisfiedareyouwiththeprofessionalismo";
    pub const SOLUTION: &str = "new_howsatisfiedareyouwiththesolutionprovided";
    pub const COMMENTS: &str = "new_doyouhaveanysuggestionsandoradditionalcom";
    pub const OWNER: &str = "ownerid";
}

pub mod investor_communication {
    pub const ENTITY: &str = "new_keyinvestorscommunication";
    pub const REFERENCE_NUMBER: &str = "new_referencenumber";
    pub const INVESTOR: &str = "new_investor";
}

pub const SYSTEM_USER: &str = "systemuser";
