//! Application message source at peer A.

use std::time::Duration;

use rand::RngExt as _;
use rand::rngs::StdRng;

use selrep_transport::wire::{Message, PAYLOAD_LEN};

/// Message `index` of a run: twenty copies of one lowercase letter,
/// cycling `a..=z`.
pub fn message(index: u64) -> Message {
    Message::new([b'a' + (index % 26) as u8; PAYLOAD_LEN])
}

/// Gap before the next message, uniform in `[0, 2 × mean]`.
pub fn interarrival(mean: Duration, rng: &mut StdRng) -> Duration {
    mean.mul_f64(2.0 * rng.random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn messages_cycle_through_alphabet() {
        assert_eq!(message(0).data, [b'a'; PAYLOAD_LEN]);
        assert_eq!(message(25).data, [b'z'; PAYLOAD_LEN]);
        assert_eq!(message(26).data, [b'a'; PAYLOAD_LEN]);
    }

    #[test]
    fn gaps_stay_within_twice_the_mean() {
        let mut rng = StdRng::seed_from_u64(2);
        let mean = Duration::from_secs(10);
        let gaps: Vec<Duration> = (0..1000).map(|_| interarrival(mean, &mut rng)).collect();
        assert!(gaps.iter().all(|g| *g <= mean * 2));
        let avg = gaps.iter().sum::<Duration>().as_secs_f64() / gaps.len() as f64;
        assert!((avg - 10.0).abs() < 1.0, "mean gap {avg}");
    }

    #[test]
    fn zero_mean_means_back_to_back() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(interarrival(Duration::ZERO, &mut rng), Duration::ZERO);
    }
}
