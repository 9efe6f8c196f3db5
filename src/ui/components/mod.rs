pub mod composer;
pub mod sidebar;
pub mod transcript_view;
