/// Terminal status for environments that are no longer reported by the admin
/// API. Soft-deleted environments are excluded from active sync sets.
pub const ENVIRONMENT_STATUS_SOFT_DELETED: &str = "SoftDeleted";

/// Status assumed when the admin API omits one.
pub const ENVIRONMENT_STATUS_ACTIVE: &str = "Active";
