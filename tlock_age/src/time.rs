//! The round↔wallclock linear mapping from §3, shared by [`crate::network`]
//! and [`crate::metadata`]. Kept as plain `u64` unix-timestamp arithmetic —
//! calendar-aware duration parsing (months, years) is a CLI concern, not a
//! core one (see design notes, Open Question (a)).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// `round_at(t) = ((unix(t) - genesis) / period) + 1`, integer division.
///
/// Saturates to round 1 for times at or before genesis rather than
/// underflowing or panicking.
pub fn round_at(genesis_time: u64, period: Duration, t: SystemTime) -> u64 {
    let unix = t
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let elapsed = unix.saturating_sub(genesis_time);
    (elapsed / period.as_secs().max(1)) + 1
}

/// `time_of(round) = genesis + (round-1)*period`, the inverse of
/// [`round_at`].
pub fn time_of(genesis_time: u64, period: Duration, round: u64) -> SystemTime {
    let offset = (round.saturating_sub(1)) * period.as_secs();
    UNIX_EPOCH + Duration::from_secs(genesis_time + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_at_genesis_is_one() {
        let genesis = 1_600_000_000u64;
        let t = UNIX_EPOCH + Duration::from_secs(genesis);
        assert_eq!(round_at(genesis, Duration::from_secs(30), t), 1);
    }

    #[test]
    fn round_at_is_monotonic_non_decreasing() {
        let genesis = 1_600_000_000u64;
        let period = Duration::from_secs(3);
        let mut last = round_at(genesis, period, UNIX_EPOCH + Duration::from_secs(genesis));
        for secs in [1, 2, 3, 30, 300, 3000] {
            let t = UNIX_EPOCH + Duration::from_secs(genesis + secs);
            let r = round_at(genesis, period, t);
            assert!(r >= last);
            last = r;
        }
    }

    #[test]
    fn time_of_is_the_inverse_of_round_at_on_exact_boundaries() {
        let genesis = 1_600_000_000u64;
        let period = Duration::from_secs(30);
        for round in [1u64, 2, 100, 100_000] {
            let t = time_of(genesis, period, round);
            assert_eq!(round_at(genesis, period, t), round);
        }
    }
}
