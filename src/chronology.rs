use crate::data_loader::Match;

/// Replay order for every stateful computation: date ascending, then creation
/// time ascending. The sort is stable, so matches colliding on both keys keep
/// their relative input order.
pub fn chronological_order(matches: &[Match]) -> Vec<&Match> {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));
    ordered
}

// One player's subsequence of an already ordered replay
pub fn player_matches<'a>(ordered: &[&'a Match], player_id: &str) -> Vec<&'a Match> {
    ordered.iter()
        .copied()
        .filter(|m| m.involves(player_id))
        .collect()
}
