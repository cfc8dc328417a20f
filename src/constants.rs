/// Activity-log categories, matching what the dashboard timeline groups on.
pub mod categories {
    pub const AUTH: &str = "auth";
    pub const GENERATE: &str = "generate";
    pub const SECURITY: &str = "security";
}

pub mod defaults {
    /// Rupees per kW of installed capacity.
    pub const RATE_PER_KW: f64 = 70000.0;

    pub const ROWS_PER_PAGE: u64 = 20;

    /// Consecutive failed logins before an account locks.
    pub const LOCKOUT_THRESHOLD: i32 = 3;

    pub const INVOICE_PREFIX: &str = "BE/KNG/PMSG/QTN";

    pub const AGREEMENT_PREFIX: &str = "AG/SG/APDCL";
}

/// Width of the zero-padded sequence segment in reference numbers.
pub const REF_SEQUENCE_WIDTH: usize = 4;
