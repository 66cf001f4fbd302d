use crate::crm::schema::incident;
use crate::crm::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationTier {
    Approval,
    Processing,
    Verification,
}

impl EscalationTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approval => "Approval",
            Self::Processing => "Processing",
            Self::Verification => "Verification",
        }
    }
}

/// SLA violation flags of a case, one array per tier, L1 first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlaViolationFlags {
    pub approval: [bool; 3],
    pub processing: [bool; 4],
    pub verification: [bool; 3],
}

impl SlaViolationFlags {
    pub fn from_entity(case: &Entity) -> Self {
        let read = |key: &str| case.get_bool(key) == Some(true);
        Self {
            approval: incident::APPROVAL_VIOLATIONS.map(read),
            processing: incident::PROCESSING_VIOLATIONS.map(read),
            verification: incident::VERIFICATION_VIOLATIONS.map(read),
        }
    }

    /// Tiers in precedence order, lowest first.
    pub fn tiers(&self) -> [(EscalationTier, &[bool]); 3] {
        [
            (EscalationTier::Approval, &self.approval[..]),
            (EscalationTier::Processing, &self.processing[..]),
            (EscalationTier::Verification, &self.verification[..]),
        ]
    }

    /// Highest set level of the last tier with any flag set. A later tier's L1
    /// outranks an earlier tier's L3.
    pub fn classify(&self) -> String {
        let mut label = "No Escalation".to_string();
        for (tier, flags) in self.tiers() {
            for (index, set) in flags.iter().enumerate() {
                if *set {
                    label = format!("{} Escalation - Level {}", tier.label(), index + 1);
                }
            }
        }
        label
    }
}

pub fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}
