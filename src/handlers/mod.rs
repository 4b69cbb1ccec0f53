// Two-tier handler layout:
// public (no session) -> protected (session cookie required)
pub mod protected;
pub mod public;
