//! Parser for the remote console `list` command response.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LIST_RESPONSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^There are (\S*) of a max of (\S*) players online: ?(.*)$")
        .expect("built-in list pattern compiles")
});

/// Online player summary reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerList {
    pub count: String,
    pub max: String,
    pub users: Vec<String>,
}

impl PlayerList {
    /// Presence text such as `[2/20] label`.
    pub fn status_line(&self, label: &str) -> String {
        format!("[{}/{}] {label}", self.count, self.max)
    }
}

/// Parse `There are N of a max of M players online: a, b`.
///
/// Returns `None` when the response has a different shape.
pub fn parse_player_list(response: &str) -> Option<PlayerList> {
    let caps = LIST_RESPONSE.captures(response.trim_end())?;
    let users = caps[3]
        .split(", ")
        .filter(|u| !u.is_empty())
        .map(str::to_owned)
        .collect();

    Some(PlayerList {
        count: caps[1].to_owned(),
        max: caps[2].to_owned(),
        users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_users() {
        let list = parse_player_list("There are 2 of a max of 20 players online: Alice, Bob")
            .expect("list response");
        assert_eq!(list.count, "2");
        assert_eq!(list.max, "20");
        assert_eq!(list.users, vec!["Alice".to_owned(), "Bob".to_owned()]);
        assert_eq!(list.status_line("Dev"), "[2/20] Dev");
    }

    #[test]
    fn empty_server_has_no_users() {
        let list = parse_player_list("There are 0 of a max of 20 players online: ")
            .expect("list response");
        assert!(list.users.is_empty());

        let list = parse_player_list("There are 0 of a max of 20 players online:")
            .expect("list response without trailing space");
        assert!(list.users.is_empty());
    }

    #[test]
    fn unrelated_response_is_none() {
        assert_eq!(parse_player_list("Unknown command"), None);
        assert_eq!(parse_player_list(""), None);
    }
}
