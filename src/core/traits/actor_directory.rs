/// Lookup of display names for actor ids.
pub trait ActorDirectory: Send + Sync {
    /// `None` when the principal is unknown (never existed or was removed).
    fn display_name(&self, actor_id: u64) -> Option<String>;
}
