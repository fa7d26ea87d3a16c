/// Maps counts to display phrases. Hosts plug their localization catalog in
/// here; [`DefaultLocalizer`] carries plain English plurals.
pub trait Localizer: Send + Sync {
    /// Vote-count label of a regular poll's section header.
    fn votes_count(&self, count: i32) -> String;
    /// Vote-count label of a quiz section header.
    fn answers_count(&self, count: i32) -> String;
    /// Caption of the "show more" control, given the remaining count.
    fn show_more(&self, count: i32) -> String;
}

pub struct DefaultLocalizer;

impl Localizer for DefaultLocalizer {
    fn votes_count(&self, count: i32) -> String {
        if count == 1 {
            "1 vote".to_string()
        } else {
            format!("{count} votes")
        }
    }

    fn answers_count(&self, count: i32) -> String {
        if count == 1 {
            "1 answer".to_string()
        } else {
            format!("{count} answers")
        }
    }

    fn show_more(&self, count: i32) -> String {
        format!("SHOW MORE ({count})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_plurals() {
        let locale = DefaultLocalizer;
        assert_eq!(locale.votes_count(1), "1 vote");
        assert_eq!(locale.votes_count(7), "7 votes");
        assert_eq!(locale.answers_count(1), "1 answer");
        assert_eq!(locale.answers_count(0), "0 answers");
        assert_eq!(locale.show_more(50), "SHOW MORE (50)");
    }
}
