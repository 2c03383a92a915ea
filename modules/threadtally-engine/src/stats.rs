/// Diagnostics from one tally run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TallyStats {
    pub posts_seen: u32,
    pub reactions: u32,
    pub content_posts: u32,
    pub candidates_extracted: u32,
    pub unique_keys: u32,
    pub ledger_hits: u32,
    pub fresh_validations: u32,
    pub validation_failures: u32,
    pub posts_with_direct_label: u32,
    pub posts_inherited: u32,
    pub posts_unlabeled: u32,
}

impl std::fmt::Display for TallyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Tally Run Complete ===")?;
        writeln!(f, "Posts seen:          {}", self.posts_seen)?;
        writeln!(f, "Reactions:           {}", self.reactions)?;
        writeln!(f, "Content posts:       {}", self.content_posts)?;
        writeln!(f, "Candidates:          {}", self.candidates_extracted)?;
        writeln!(f, "Unique keys:         {}", self.unique_keys)?;
        writeln!(f, "Ledger hits:         {}", self.ledger_hits)?;
        writeln!(f, "Fresh validations:   {}", self.fresh_validations)?;
        writeln!(f, "Validation failures: {}", self.validation_failures)?;
        writeln!(f, "Direct labels:       {}", self.posts_with_direct_label)?;
        writeln!(f, "Inherited labels:    {}", self.posts_inherited)?;
        writeln!(f, "Unlabeled:           {}", self.posts_unlabeled)?;
        Ok(())
    }
}
