use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

/// ページ間の待機（min〜max の一様乱数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessDelay {
    pub min: Duration,
    pub max: Duration,
}

impl PolitenessDelay {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// 待機なし（テスト用）
    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        debug!("Waiting {:?} before next page", delay);
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_within_bounds() {
        let delay = PolitenessDelay::new(Duration::from_millis(1000), Duration::from_millis(3000));
        for _ in 0..200 {
            let d = delay.sample();
            assert!(d >= delay.min && d <= delay.max, "{:?} out of range", d);
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let delay = PolitenessDelay::new(Duration::from_millis(500), Duration::from_millis(100));
        assert_eq!(delay.sample(), Duration::from_millis(500));
        assert_eq!(PolitenessDelay::none().sample(), Duration::ZERO);
    }
}
