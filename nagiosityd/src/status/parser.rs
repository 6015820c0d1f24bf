use shared::types::{Block, FieldValue};

/// A closed block in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    pub kind: String,
    pub fields: Block,
}

/// Parser output. Malformed blocks are dropped and only counted.
#[derive(Debug, Default)]
pub struct ParsedStatus {
    pub blocks: Vec<RawBlock>,
    pub skipped_blocks: usize,
}

impl ParsedStatus {
    fn skip(&mut self, kind: &str, start_line: usize, reason: &str) {
        tracing::warn!(
            block = kind,
            line = start_line,
            "Skipping malformed status block: {}",
            reason
        );
        self.skipped_blocks += 1;
    }
}

enum State {
    Outside,
    Inside {
        kind: String,
        fields: Block,
        start_line: usize,
        /// First problem found in this block, if any
        problem: Option<&'static str>,
    },
}

impl State {
    fn open(kind: String, start_line: usize) -> Self {
        State::Inside {
            kind,
            fields: Block::new(),
            start_line,
            problem: None,
        }
    }
}

/// Parse status file text into blocks.
///
/// Tolerant: a block containing a bad line, a block that is never closed, and
/// a block interrupted by another opener are skipped as a whole and counted in
/// `skipped_blocks`. Lines outside any block that are not openers are ignored.
pub fn parse_status(text: &str) -> ParsedStatus {
    let mut parsed = ParsedStatus::default();
    let mut state = State::Outside;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || line.starts_with('#') {
            continue;
        }

        state = match state {
            State::Outside => match block_opener(trimmed) {
                Some(kind) => State::open(kind.to_string(), line_no),
                None => {
                    tracing::debug!(line = line_no, "Ignoring stray line outside any block");
                    State::Outside
                }
            },
            State::Inside {
                kind,
                mut fields,
                start_line,
                mut problem,
            } => {
                if trimmed == "}" {
                    match problem {
                        Some(reason) => parsed.skip(&kind, start_line, reason),
                        None => parsed.blocks.push(RawBlock { kind, fields }),
                    }
                    State::Outside
                } else if let Some((name, value)) = line.split_once('=') {
                    let name = name.trim();
                    if name.is_empty() {
                        problem.get_or_insert("field without a name");
                    } else {
                        fields.insert(name.to_string(), FieldValue::from_raw(value));
                    }
                    State::Inside {
                        kind,
                        fields,
                        start_line,
                        problem,
                    }
                } else if let Some(next) = block_opener(trimmed) {
                    parsed.skip(&kind, start_line, "block not closed before next block");
                    State::open(next.to_string(), line_no)
                } else {
                    problem.get_or_insert("line is not a name=value field");
                    State::Inside {
                        kind,
                        fields,
                        start_line,
                        problem,
                    }
                }
            }
        };
    }

    if let State::Inside {
        kind, start_line, ..
    } = state
    {
        parsed.skip(&kind, start_line, "block not closed at end of input");
    }

    parsed
}

/// `hoststatus {` yields `hoststatus`.
fn block_opener(trimmed: &str) -> Option<&str> {
    let kind = trimmed.strip_suffix('{')?.trim_end();
    let valid = !kind.is_empty() && !kind.contains(|c: char| c.is_whitespace() || c == '=');
    valid.then_some(kind)
}
