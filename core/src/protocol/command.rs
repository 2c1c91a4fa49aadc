//! Parsing a raw command line into a [`Command`].
//!
//! The grammar is deliberately forgiving about whitespace and the case of
//! the verb, and deliberately strict about everything else: wrong arity or
//! an unparseable numeric field is a [`ParseError`], which the caller turns
//! into `FAILURE INVALID -1` without ever looking at the error's detail —
//! the wire protocol has no room for it.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,
    #[error("unknown command")]
    UnknownCommand,
    #[error("wrong number of arguments")]
    WrongArity,
    #[error("malformed account id")]
    BadAccountId,
    #[error("malformed amount")]
    BadAmount,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Create,
    Deposit { id: u64, amount: f64 },
    Withdraw { id: u64, amount: f64 },
    Transfer { from: u64, to: u64, amount: f64 },
    Balance { id: u64 },
    BalanceAll,
    ModeSingle,
    ModeMulti,
    ModeStatus,
    Shutdown,
}

impl Command {
    /// Parses one already-line-delimited command. `line` should have any
    /// trailing `\r`/`\n` already stripped.
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(ParseError::Empty)?;

        match verb.to_ascii_uppercase().as_str() {
            "CREATE" => {
                expect_no_more(tokens)?;
                Ok(Command::Create)
            }
            "DEPOSIT" => {
                let id = next_id(&mut tokens)?;
                let amount = next_amount(&mut tokens)?;
                expect_no_more(tokens)?;
                Ok(Command::Deposit { id, amount })
            }
            "WITHDRAW" => {
                let id = next_id(&mut tokens)?;
                let amount = next_amount(&mut tokens)?;
                expect_no_more(tokens)?;
                Ok(Command::Withdraw { id, amount })
            }
            "TRANSFER" => {
                let from = next_id(&mut tokens)?;
                let to = next_id(&mut tokens)?;
                let amount = next_amount(&mut tokens)?;
                expect_no_more(tokens)?;
                Ok(Command::Transfer { from, to, amount })
            }
            "BALANCE" => {
                let id = next_id(&mut tokens)?;
                expect_no_more(tokens)?;
                Ok(Command::Balance { id })
            }
            "BALANCE_ALL" => {
                expect_no_more(tokens)?;
                Ok(Command::BalanceAll)
            }
            "MODE_SINGLE" => {
                expect_no_more(tokens)?;
                Ok(Command::ModeSingle)
            }
            "MODE_MULTI" => {
                expect_no_more(tokens)?;
                Ok(Command::ModeMulti)
            }
            "MODE_STATUS" => {
                expect_no_more(tokens)?;
                Ok(Command::ModeStatus)
            }
            "SHUTDOWN" => {
                expect_no_more(tokens)?;
                Ok(Command::Shutdown)
            }
            _ => Err(ParseError::UnknownCommand),
        }
    }
}

fn next_id<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<u64, ParseError> {
    tokens
        .next()
        .ok_or(ParseError::WrongArity)?
        .parse::<u64>()
        .map_err(|_| ParseError::BadAccountId)
}

fn next_amount<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<f64, ParseError> {
    let raw = tokens.next().ok_or(ParseError::WrongArity)?;
    let amount = raw.parse::<f64>().map_err(|_| ParseError::BadAmount)?;
    if !amount.is_finite() {
        return Err(ParseError::BadAmount);
    }
    Ok(amount)
}

fn expect_no_more<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<(), ParseError> {
    match tokens.next() {
        Some(_) => Err(ParseError::WrongArity),
        None => Ok(()),
    }
}
