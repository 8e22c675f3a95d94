//! A whole table on one terminal.
//!
//! Every line on stdin is either a host command or a player speaking:
//!
//! ```text
//! join 1 alice       seat player 1 in the lobby
//! leave 1
//! start              deal roles and enter the first night
//! info
//! 3 #guard 5         player 3 sends "#guard 5"
//! quit
//! ```
//!
//! Group notices print as `[all]`, private ones as `[@id]`. Pass a TOML
//! file as an argument to override the default rules, and `--json` to print
//! every delivery as the JSON frame a chat adapter would receive.

use std::sync::Arc;

use lupine::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

const GROUP: GroupId = GroupId(1);

enum Line<'a> {
    Join(PlayerId, Option<&'a str>),
    Leave(PlayerId),
    Start,
    Info,
    Quit,
    Say(PlayerId, &'a str),
}

fn parse(line: &str) -> Option<Line<'_>> {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let id = || rest.split_whitespace().next()?.parse().ok().map(PlayerId);
    match head {
        "join" => {
            let nickname = rest.split_whitespace().nth(1);
            Some(Line::Join(id()?, nickname))
        }
        "leave" => Some(Line::Leave(id()?)),
        "start" => Some(Line::Start),
        "info" => Some(Line::Info),
        "quit" | "exit" => Some(Line::Quit),
        _ => {
            let actor = head.parse().ok().map(PlayerId)?;
            Some(Line::Say(actor, rest))
        }
    }
}

/// Runs one input line. `Ok(false)` means the session is over.
async fn run_line(registry: &GameRegistry, line: &str) -> Result<bool, LupineError> {
    let Some(parsed) = parse(line) else {
        eprintln!("unrecognized input: {line}");
        return Ok(true);
    };
    match parsed {
        Line::Join(id, nickname) => {
            let mut profile = PlayerProfile::new(id);
            if let Some(nickname) = nickname {
                profile = profile.with_nickname(nickname);
            }
            registry.join(GROUP, profile).await?;
        }
        Line::Leave(id) => {
            if !registry.leave(GROUP, id).await? {
                eprintln!("{id} was not in the lobby");
            }
        }
        Line::Start => registry.start(GROUP).await?,
        Line::Info => {
            let info = registry.info(GROUP).await?;
            println!(
                "table {}: {} players, phase {:?}, turn {:?}",
                info.state, info.players, info.phase, info.turn
            );
        }
        Line::Quit => return Ok(false),
        Line::Say(actor, text) => {
            let command = Command::parse_line(actor, GROUP, text)?;
            // Rejections already reach the player as a notice.
            if let Err(err) = registry.dispatch(command).await {
                tracing::debug!(%actor, %err, "command rejected");
            }
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lupine::telemetry::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|arg| arg == "--json");
    let config = match args.iter().find(|arg| !arg.starts_with("--")) {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let mut registry = GameRegistry::new();
    if json {
        let (sink, mut frames) = EncodedSink::new(JsonCodec);
        registry.create(GROUP, config, Arc::new(sink))?;
        tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                println!("{}", String::from_utf8_lossy(&frame));
            }
        });
    } else {
        let (sink, mut notices) = ChannelSink::new();
        registry.create(GROUP, config, Arc::new(sink))?;
        tokio::spawn(async move {
            while let Some(delivery) = notices.recv().await {
                match delivery.to {
                    Recipient::Group => println!("[all] {}", delivery.notice),
                    Recipient::Player(id) => println!("[@{id}] {}", delivery.notice),
                }
            }
        });
    }

    eprintln!("lupine console: join, start, then `<id> #verb [arg]`");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match run_line(&registry, line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) if err.is_player_facing() => eprintln!("rejected: {err}"),
            Err(err) => eprintln!("error: {err}"),
        }
    }

    registry.remove(GROUP).await?;
    Ok(())
}
