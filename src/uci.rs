use crate::game::{GameState, GameStatus};
use crate::movegen::MoveGenerator;
use crate::search::Search;
use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use std::io::{self, BufRead, Write};

pub struct UciHandler {
    state: GameState,
    move_generator: MoveGenerator,
    search: Search,
}

impl UciHandler {
    pub fn new() -> Self {
        UciHandler {
            state: GameState::new(),
            move_generator: MoveGenerator::new(),
            search: Search::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            match self.handle_command(command) {
                Ok(response) => print!("{}", response),
                Err(err) => println!("info string error: {:#}", err),
            }

            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match parts[0] {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => Ok(self.handle_ucinewgame()),
            "position" => self.handle_position(&parts[1..]),
            "go" => self.handle_go(&parts[1..]),
            "perft" => self.handle_perft(&parts[1..]),
            "undo" => Ok(self.handle_undo()),
            "d" => Ok(self.handle_display()),
            "quit" => Ok("".to_string()),
            other => bail!("unknown command: {}", other),
        }
    }

    fn handle_uci(&self) -> String {
        format!(
            "id name Salmon Chess {}\nid author the salmon-chess developers\nuciok\n",
            env!("CARGO_PKG_VERSION")
        )
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.state = GameState::new();
        "".to_string()
    }

    fn handle_position(&mut self, parts: &[&str]) -> Result<String> {
        let moves_at = parts.iter().position(|part| *part == "moves");
        let (setup, moves) = match moves_at {
            Some(index) => (&parts[..index], &parts[index + 1..]),
            None => (parts, &parts[parts.len()..]),
        };

        let mut state = match setup.split_first() {
            Some((&"startpos", [])) => GameState::new(),
            Some((&"fen", fields)) if !fields.is_empty() => {
                let fen = fields.join(" ");
                GameState::from_fen(&fen).with_context(|| format!("bad position: {}", fen))?
            }
            _ => bail!("expected `position startpos` or `position fen <fen>`"),
        };

        for text in moves {
            state
                .play(text)
                .with_context(|| format!("cannot play {} in {}", text, state.to_fen()))?;
        }

        // Only replace the current game once the whole command has been accepted
        self.state = state;
        Ok("".to_string())
    }

    fn handle_go(&mut self, parts: &[&str]) -> Result<String> {
        let mut max_depth = self.search.config().depth;

        for i in 0..parts.len() {
            if parts[i] == "depth" {
                max_depth = parts
                    .get(i + 1)
                    .and_then(|s| s.parse::<u32>().ok())
                    .context("go depth needs a number")?;
            }
        }

        self.search.set_max_depth(max_depth);

        let legal_moves = self.move_generator.legal_moves(&mut self.state);
        let result = self.search.find_best_move(&mut self.state, &legal_moves);
        let best_move = result
            .best_move
            .or_else(|| legal_moves.choose(&mut rand::thread_rng()).copied());

        let mut response = format!(
            "info depth {} nodes {} score cp {}\n",
            max_depth.max(1),
            result.nodes,
            result.score
        );
        match best_move {
            Some(mv) => response.push_str(&format!("bestmove {}\n", mv)),
            None => response.push_str("bestmove (none)\n"),
        }
        Ok(response)
    }

    fn handle_perft(&mut self, parts: &[&str]) -> Result<String> {
        let depth = parts
            .first()
            .and_then(|s| s.parse::<u32>().ok())
            .context("perft needs a depth")?;
        let nodes = self.move_generator.perft(&mut self.state, depth);
        Ok(format!("nodes {}\n", nodes))
    }

    fn handle_undo(&mut self) -> String {
        self.state.undo_move();
        "".to_string()
    }

    fn handle_display(&mut self) -> String {
        // Refresh the terminal flags for the position being shown
        self.move_generator.legal_moves(&mut self.state);
        let status = match self.state.status() {
            GameStatus::Ongoing if self.state.in_check => "check".to_string(),
            GameStatus::Ongoing => "ongoing".to_string(),
            GameStatus::Checkmate(winner) => format!("checkmate, {:?} wins", winner),
            GameStatus::Stalemate => "stalemate".to_string(),
            GameStatus::DrawByRepetition => "draw by repetition".to_string(),
        };
        format!("{}\nFen: {}\nStatus: {}\n", self.state.board, self.state.to_fen(), status)
    }
}

impl Default for UciHandler {
    fn default() -> Self {
        Self::new()
    }
}
