//! `mcwatch players` — parse a remote console `list` response from stdin.

use std::io::Read;

use mcwatch_core::parse_player_list;

use crate::cli::PlayersOpts;

pub fn cmd_players(opts: &PlayersOpts) -> anyhow::Result<()> {
    let mut response = String::new();
    std::io::stdin().read_to_string(&mut response)?;

    let Some(list) = parse_player_list(response.trim()) else {
        anyhow::bail!("unrecognised list response: {}", response.trim());
    };

    match opts.status_label {
        Some(ref label) => println!("{}", list.status_line(label)),
        None => println!("{}", serde_json::to_string(&list)?),
    }
    Ok(())
}
