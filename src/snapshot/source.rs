use super::types::GameSnapshot;
use serde::Serialize;
use std::io::{BufRead, Write};

/// The seam between the telemetry layer and the game engine.
pub trait GameSource {
    /// Copy the current game state. `None` means no game is loaded yet.
    fn snapshot(&mut self) -> Option<GameSnapshot>;

    /// Whether [`spawn_monstie`](Self::spawn_monstie) and
    /// [`kill_monster`](Self::kill_monster) reach the engine. When false the
    /// service neither fetches monsties (the portal forgets them once
    /// fetched) nor hands over admin kills.
    fn accepts_commands(&self) -> bool {
        false
    }

    /// Ask the engine to place a monstie for the given portal pod name.
    /// Returns whether one was placed.
    fn spawn_monstie(&mut self, _pod_name: &str) -> bool {
        false
    }

    /// Kill a monster on an admin's request. Returns whether it was found.
    fn kill_monster(&mut self, _monster_id: i32) -> bool {
        false
    }
}

/// A request for the engine, written as one JSON line by [`JsonLinesSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    SpawnMonstie {
        #[serde(rename = "podName")]
        pod_name: String,
    },
    KillMonster {
        #[serde(rename = "monsterID")]
        monster_id: i32,
    },
}

/// Reads one JSON-encoded [`GameSnapshot`] per line, e.g. from a pipe the
/// engine writes to.
///
/// The most recent good line wins; lines that fail to parse are logged and
/// skipped. End of input keeps returning the last snapshot seen.
///
/// Without a command writer the source is read-only. With one, monstie
/// spawns and admin kills are written to it as [`EngineCommand`] lines for
/// the engine to carry out.
pub struct JsonLinesSource<R> {
    reader: R,
    commands: Option<Box<dyn Write + Send>>,
    last: Option<GameSnapshot>,
    exhausted: bool,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            commands: None,
            last: None,
            exhausted: false,
        }
    }

    /// Forward engine commands to `writer`, one JSON object per line.
    pub fn with_commands(mut self, writer: impl Write + Send + 'static) -> Self {
        self.commands = Some(Box::new(writer));
        self
    }

    fn send_command(&mut self, command: &EngineCommand) -> bool {
        let Some(writer) = self.commands.as_mut() else {
            return false;
        };
        let written = serde_json::to_writer(&mut *writer, command)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        match written {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write engine command: {}", e);
                false
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn read_next(&mut self) -> Option<GameSnapshot> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.exhausted = true;
                    return None;
                }
                Ok(_) if line.trim().is_empty() => continue,
                Ok(_) => match serde_json::from_str::<GameSnapshot>(line.trim()) {
                    Ok(snapshot) => return Some(snapshot),
                    Err(e) => {
                        log::warn!("Ignoring unparseable snapshot line: {}", e);
                        continue;
                    }
                },
                Err(e) => {
                    log::error!("Failed to read snapshot input: {}", e);
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead> GameSource for JsonLinesSource<R> {
    fn snapshot(&mut self) -> Option<GameSnapshot> {
        if !self.exhausted {
            if let Some(next) = self.read_next() {
                self.last = Some(next);
            }
        }
        self.last.clone()
    }

    fn accepts_commands(&self) -> bool {
        self.commands.is_some()
    }

    fn spawn_monstie(&mut self, pod_name: &str) -> bool {
        self.send_command(&EngineCommand::SpawnMonstie {
            pod_name: pod_name.to_string(),
        })
    }

    fn kill_monster(&mut self, monster_id: i32) -> bool {
        self.send_command(&EngineCommand::KillMonster { monster_id })
    }
}
