use std::path::Path;

use chrono::NaiveDate;
use include_dir::{include_dir, Dir};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::clock;
use crate::error::ProviderError;
use crate::mode::TimeControlFilter;
use crate::record::GameRecord;

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const BUNDLED_GAMES: &str = "games.json";

/// Source of recorded games to guess on
pub trait GameProvider {
    /// Up to `limit` games matching `filter`, in play order
    fn fetch_games(
        &mut self,
        filter: TimeControlFilter,
        limit: usize,
    ) -> Result<Vec<GameRecord>, ProviderError>;

    /// The one game every player gets on `day`
    fn fetch_daily(&mut self, day: NaiveDate) -> Result<GameRecord, ProviderError>;
}

/// Provider over an in-process pool of games, either the set bundled into
/// the binary or a JSON file supplied by the player
pub struct LocalProvider {
    games: Vec<GameRecord>,
    rng: StdRng,
}

impl LocalProvider {
    pub fn new(games: Vec<GameRecord>, rng: StdRng) -> Self {
        Self { games, rng }
    }

    pub fn bundled(rng: StdRng) -> Result<Self, ProviderError> {
        let json = ASSETS
            .get_file(BUNDLED_GAMES)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| ProviderError::MissingAsset(BUNDLED_GAMES.to_string()))?;
        Ok(Self::new(serde_json::from_str(json)?, rng))
    }

    pub fn from_path<P: AsRef<Path>>(path: P, rng: StdRng) -> Result<Self, ProviderError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(serde_json::from_slice(&bytes)?, rng))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl GameProvider for LocalProvider {
    fn fetch_games(
        &mut self,
        filter: TimeControlFilter,
        limit: usize,
    ) -> Result<Vec<GameRecord>, ProviderError> {
        let pool: Vec<&GameRecord> = self
            .games
            .iter()
            .filter(|g| filter.matches(&g.event))
            .collect();
        if pool.is_empty() {
            return Err(ProviderError::NoGames(filter));
        }

        // Shuffled passes over the pool; repeats only once it is exhausted
        let mut batch = Vec::with_capacity(limit);
        while batch.len() < limit {
            let mut pass = pool.clone();
            pass.shuffle(&mut self.rng);
            batch.extend(pass.into_iter().take(limit - batch.len()).cloned());
        }
        debug!(%filter, limit, pool = pool.len(), "fetched game batch");
        Ok(batch)
    }

    fn fetch_daily(&mut self, day: NaiveDate) -> Result<GameRecord, ProviderError> {
        if self.games.is_empty() {
            return Err(ProviderError::NoGames(TimeControlFilter::Any));
        }
        let days = clock::days_between(clock::epoch_start(), day);
        let idx = (days.wrapping_mul(7919)).rem_euclid(self.games.len() as i64) as usize;
        Ok(self.games[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn game(event: &str, white: u32) -> GameRecord {
        GameRecord {
            moves: "e4 e5".into(),
            site: String::new(),
            event: event.into(),
            time_control: "60+0".into(),
            white_elo: white,
            black_elo: white + 10,
        }
    }

    fn provider(games: Vec<GameRecord>) -> LocalProvider {
        LocalProvider::new(games, StdRng::seed_from_u64(1))
    }

    #[test]
    fn bundled_games_load_and_cover_every_time_control() {
        let mut p = LocalProvider::bundled(StdRng::seed_from_u64(2)).unwrap();
        assert!(p.len() >= 20);
        for filter in TimeControlFilter::ALL {
            let batch = p.fetch_games(filter, 5).unwrap();
            assert_eq!(batch.len(), 5);
            assert!(batch.iter().all(|g| filter.matches(&g.event)));
        }
    }

    #[test]
    fn filter_restricts_batch() {
        let mut p = provider(vec![
            game("Rated Bullet game", 1000),
            game("Rated Blitz game", 1100),
            game("Rated Blitz game", 1200),
        ]);
        let batch = p.fetch_games(TimeControlFilter::Blitz, 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|g| g.event.contains("Blitz")));
        let mut elos: Vec<u32> = batch.iter().map(|g| g.white_elo).collect();
        elos.sort();
        assert_eq!(elos, vec![1100, 1200]);
    }

    #[test]
    fn small_pool_repeats_to_fill_batch() {
        let mut p = provider(vec![game("Rated Rapid game", 1500)]);
        let batch = p.fetch_games(TimeControlFilter::Any, 20).unwrap();
        assert_eq!(batch.len(), 20);
    }

    #[test]
    fn empty_filter_result_is_an_error() {
        let mut p = provider(vec![game("Rated Bullet game", 1000)]);
        assert!(matches!(
            p.fetch_games(TimeControlFilter::Classical, 5),
            Err(ProviderError::NoGames(TimeControlFilter::Classical))
        ));
    }

    #[test]
    fn daily_game_is_stable_per_day() {
        let games: Vec<GameRecord> = (0..10).map(|i| game("Rated Blitz game", 1000 + i)).collect();
        let mut a = LocalProvider::new(games.clone(), StdRng::seed_from_u64(1));
        let mut b = LocalProvider::new(games, StdRng::seed_from_u64(99));
        let day = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(a.fetch_daily(day).unwrap(), b.fetch_daily(day).unwrap());
        let next = day.succ_opt().unwrap();
        assert_ne!(a.fetch_daily(day).unwrap(), a.fetch_daily(next).unwrap());
    }

    #[test]
    fn loads_games_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("games.json");
        let games = vec![game("Rated Classical game", 2000)];
        std::fs::write(&path, serde_json::to_vec(&games).unwrap()).unwrap();
        let mut p = LocalProvider::from_path(&path, StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(p.fetch_daily(clock::epoch_start()).unwrap(), games[0]);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("games.json");
        std::fs::write(&path, b"[{\"Moves\": 3}]").unwrap();
        assert!(matches!(
            LocalProvider::from_path(&path, StdRng::seed_from_u64(1)),
            Err(ProviderError::Malformed(_))
        ));
    }
}
