pub mod best_scores;
pub mod ledger;
