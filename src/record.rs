use serde::{Deserialize, Serialize};

/// One recorded chess game as served by the game-record provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameRecord {
    /// Move list in SAN, space separated
    pub moves: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub time_control: String,
    pub white_elo: u32,
    pub black_elo: u32,
}

impl GameRecord {
    /// Rating of the player on the given side
    pub fn elo_for(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::White => self.white_elo,
            Orientation::Black => self.black_elo,
        }
    }

    /// "{Event} {TimeControl}" as shown above the board
    pub fn label(&self) -> String {
        format!("{} {}", self.event, self.time_control)
            .trim()
            .to_string()
    }
}

/// Which side of the board faces the player, and so whose rating is guessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    White,
    Black,
}

impl Orientation {
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Orientation::White
        } else {
            Orientation::Black
        }
    }
}

/// One resolved round. Records are only created once the round has been
/// answered or timed out and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub elo_choices: [u32; 4],
    pub correct_elo: u32,
    pub user_answer: Option<u32>,
    pub timed_out: bool,
    pub was_correct: bool,
    pub seconds_used: u32,
    pub seconds_remaining: u32,
    pub round_score: u32,
}

impl RoundRecord {
    pub fn correct_index(&self) -> Option<usize> {
        self.elo_choices.iter().position(|&e| e == self.correct_elo)
    }

    pub fn answer_index(&self) -> Option<usize> {
        let answer = self.user_answer?;
        self.elo_choices.iter().position(|&e| e == answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> GameRecord {
        GameRecord {
            moves: "e4 e5 Nf3".into(),
            site: "https://lichess.org/abcd1234".into(),
            event: "Rated Blitz game".into(),
            time_control: "180+2".into(),
            white_elo: 1850,
            black_elo: 1910,
        }
    }

    #[test]
    fn elo_follows_orientation() {
        let game = record();
        assert_eq!(game.elo_for(Orientation::White), 1850);
        assert_eq!(game.elo_for(Orientation::Black), 1910);
    }

    #[test]
    fn label_joins_event_and_time_control() {
        assert_eq!(record().label(), "Rated Blitz game 180+2");
    }

    #[test]
    fn parses_provider_field_names() {
        let json = r#"{"Moves":"d4 d5","Site":"x","Event":"Rated Rapid game","TimeControl":"600+0","WhiteElo":1500,"BlackElo":1450}"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(game.moves, "d4 d5");
        assert_eq!(game.white_elo, 1500);
        assert_eq!(game.black_elo, 1450);
    }

    #[test]
    fn round_indices() {
        let round = RoundRecord {
            elo_choices: [1700, 1800, 1900, 2000],
            correct_elo: 1900,
            user_answer: Some(1800),
            timed_out: false,
            was_correct: false,
            seconds_used: 10,
            seconds_remaining: 80,
            round_score: 0,
        };
        assert_eq!(round.correct_index(), Some(2));
        assert_eq!(round.answer_index(), Some(1));
    }
}
