// crates/core/src/time_split.rs
//! Human vs. assistant time attribution over a session's message timeline.
//!
//! Derived metric computed on read, never stored. For each adjacent pair of
//! timestamps the gap is attributed to exactly one bucket: idle when it
//! exceeds the threshold, otherwise human or claude depending on who spoke
//! next. Aggregation across sessions sums counters and recomputes
//! percentages, so long sessions correctly dominate short ones.

use claude_scope_types::{MessageRole, ParsedMessage, TimeSplit};

/// Default idle threshold: gaps longer than 30 minutes are idle time.
pub const DEFAULT_IDLE_THRESHOLD_MS: i64 = 30 * 60 * 1000;

/// Classify a chronologically sorted message timeline into time buckets.
///
/// Rules per adjacent pair (delta = later − earlier):
/// - negative delta (out-of-order input): skipped
/// - delta > threshold: all idle, `gap_count += 1`
/// - assistant→user or user→user: human time
/// - user→assistant or assistant→assistant: claude time
/// - any pairing involving another role: split 50/50
///
/// Fewer than two messages yields an all-zero result.
pub fn compute_time_split(messages: &[ParsedMessage], idle_threshold_ms: i64) -> TimeSplit {
    let mut split = TimeSplit::default();

    for pair in messages.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let delta = next.timestamp - prev.timestamp;

        if delta < 0 {
            continue;
        }

        if delta > idle_threshold_ms {
            split.idle_ms += delta;
            split.gap_count += 1;
            continue;
        }

        use MessageRole::*;
        match (prev.role, next.role) {
            // Time leading up to a human turn was spent by the human.
            (Assistant, User) | (User, User) => split.human_ms += delta,
            // Time leading up to an assistant turn was spent generating.
            (User, Assistant) | (Assistant, Assistant) => split.claude_ms += delta,
            // Conservative fallback for unclassifiable roles.
            _ => {
                let half = delta / 2;
                split.human_ms += half;
                split.claude_ms += delta - half;
            }
        }
        split.message_pair_count += 1;
    }

    split.active_ms = split.human_ms + split.claude_ms;
    recompute_percentages(&mut split);
    split
}

/// Sum many splits into one, recomputing percentages from the summed totals.
///
/// Associative and order-independent. Never averages per-session percentages.
pub fn aggregate_time_splits(splits: &[TimeSplit]) -> TimeSplit {
    let mut total = TimeSplit::default();
    for s in splits {
        total.active_ms += s.active_ms;
        total.human_ms += s.human_ms;
        total.claude_ms += s.claude_ms;
        total.idle_ms += s.idle_ms;
        total.message_pair_count += s.message_pair_count;
        total.gap_count += s.gap_count;
    }
    recompute_percentages(&mut total);
    total
}

/// Integer-rounded shares of active time; both zero when there is none.
fn recompute_percentages(split: &mut TimeSplit) {
    if split.active_ms == 0 {
        split.human_percentage = 0;
        split.claude_percentage = 0;
        return;
    }
    split.human_percentage =
        ((split.human_ms as f64 / split.active_ms as f64) * 100.0).round() as u32;
    split.claude_percentage =
        ((split.claude_ms as f64 / split.active_ms as f64) * 100.0).round() as u32;
}
