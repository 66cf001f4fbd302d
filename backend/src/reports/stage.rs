/// Pipeline stage for a case status code. Total: unknown codes map to
/// `"Unknown"`.
pub fn map_stage(status_code: Option<i32>) -> &'static str {
    match status_code {
        Some(100000000) => "Ticket Creation",
        Some(100000006) => "Approval and Forwarding",
        Some(100000002) => "Solution Verification",
        Some(100000008) => "Processing",
        Some(1) => "Processing- Department",
        Some(100000001) => "Return to Customer",
        Some(100000003) => "Ticket Closure",
        Some(100000005) => "Ticket Reopen",
        Some(5) => "Problem Solved",
        Some(1000) => "Information Provided",
        Some(6) => "Cancelled",
        Some(2000) => "Merged",
        Some(100000007) => "Close",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(map_stage(Some(100000000)), "Ticket Creation");
        assert_eq!(map_stage(Some(1)), "Processing- Department");
        assert_eq!(map_stage(Some(2000)), "Merged");
        assert_eq!(map_stage(Some(100000007)), "Close");
    }

    #[test]
    fn test_unknown_codes() {
        for code in [0, 2, 3, 4, 7, 999, 100000004, 100000009, -1, i32::MAX] {
            assert_eq!(map_stage(Some(code)), "Unknown", "code {code}");
        }
        assert_eq!(map_stage(None), "Unknown");
    }
}
