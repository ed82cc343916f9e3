pub const DB_SYNC_HASH: &str = "dbsync";
pub const DEPLOYMENT_HASH: &str = "deployment";

open_string_enum! {
    /// dependent resource tracked by a change detection hash
    HashTag {
        DbSync => "dbsync",
        Deployment => "deployment",
    }
}
