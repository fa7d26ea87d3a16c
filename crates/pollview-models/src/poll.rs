use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub answers: Vec<PollAnswer>,
    pub quiz: bool,
    pub allow_multiselect: bool,
    pub closed: bool,
    /// Number of distinct users that voted, across all answers.
    pub total_voters: i32,
}

impl Poll {
    pub fn answer(&self, option: &[u8]) -> Option<&PollAnswer> {
        self.answers.iter().find(|a| a.option == option)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollAnswer {
    pub text: String,
    /// Opaque server-issued key identifying this answer option.
    pub option: Bytes,
    pub votes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_lookup_by_option_bytes() {
        let poll = Poll {
            id: 1,
            question: "?".into(),
            answers: vec![PollAnswer {
                text: "Yes".into(),
                option: Bytes::from_static(b"\x00"),
                votes: 4,
            }],
            quiz: false,
            allow_multiselect: false,
            closed: false,
            total_voters: 4,
        };

        assert_eq!(poll.answer(b"\x00").expect("answer").votes, 4);
        assert!(poll.answer(b"\x01").is_none());
    }
}
