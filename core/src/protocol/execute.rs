//! Turning a parsed [`Command`] into a ledger call and a wire reply.
//!
//! `execute` is the one function that glues the Ledger to the wire: give it
//! a raw line, a `Ledger`, and a `ServerControl`, and it gives back the
//! exact bytes to write back to the client. It does not touch a socket.

use std::thread;
use std::time::Duration;

use crate::control::ServerControl;
use crate::ledger::Ledger;

use super::command::Command;

/// Parses `line`, dispatches to `ledger`/`control`, and renders the reply.
///
/// `simulated_delay` is slept before data-plane commands (`CREATE`,
/// `DEPOSIT`, `WITHDRAW`, `TRANSFER`, `BALANCE`, `BALANCE_ALL`) to make
/// thread-pool concurrency observable under load; it is skipped for
/// control-plane commands (`MODE_*`, `SHUTDOWN`) so an operator is never
/// stuck waiting out a queue of simulated latency to change mode or stop
/// the server. Pass `Duration::ZERO` in tests.
pub fn execute(
    line: &str,
    ledger: &Ledger,
    control: &ServerControl,
    simulated_delay: Duration,
) -> String {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(_) => return "FAILURE INVALID -1\n".to_string(),
    };

    if is_data_plane(&command) && !simulated_delay.is_zero() {
        thread::sleep(simulated_delay);
    }

    match command {
        Command::Create => match ledger.create() {
            Ok(id) => format!("SUCCESS CREATE {id}\n"),
            Err(_) => "FAILURE CREATE -1\n".to_string(),
        },
        Command::Deposit { id, amount } => match ledger.deposit(id, amount) {
            Ok(balance) => format!("SUCCESS DEPOSIT {:.2}\n", balance),
            Err(_) => "FAILURE DEPOSIT -1\n".to_string(),
        },
        Command::Withdraw { id, amount } => match ledger.withdraw(id, amount) {
            Ok(balance) => format!("SUCCESS WITHDRAW {:.2}\n", balance),
            Err(_) => "FAILURE WITHDRAW -1\n".to_string(),
        },
        Command::Transfer { from, to, amount } => match ledger.transfer(from, to, amount) {
            Ok(balance) => format!("SUCCESS TRANSFER {:.2}\n", balance),
            Err(_) => "FAILURE TRANSFER -1\n".to_string(),
        },
        Command::Balance { id } => match ledger.balance_of(id) {
            Ok(balance) => format!("SUCCESS BALANCE {:.2}\n", balance),
            Err(_) => "FAILURE BALANCE -1\n".to_string(),
        },
        Command::BalanceAll => render_balance_all(ledger),
        Command::ModeSingle => {
            control.set_single_threaded(true);
            "SUCCESS MODE_SINGLE enabled\n".to_string()
        }
        Command::ModeMulti => {
            control.set_single_threaded(false);
            "SUCCESS MODE_MULTI enabled\n".to_string()
        }
        Command::ModeStatus => {
            let mode = if control.is_single_threaded() {
                "single"
            } else {
                "multi"
            };
            format!("SUCCESS MODE_STATUS {mode}\n")
        }
        Command::Shutdown => {
            control.request_shutdown();
            "SUCCESS SHUTDOWN\n".to_string()
        }
    }
}

fn is_data_plane(command: &Command) -> bool {
    !matches!(
        command,
        Command::ModeSingle | Command::ModeMulti | Command::ModeStatus | Command::Shutdown
    )
}

fn render_balance_all(ledger: &Ledger) -> String {
    let snapshot = ledger.snapshot();
    if snapshot.is_empty() {
        return "No accounts found.\n".to_string();
    }
    let mut reply = String::from("--- All Account Balances ---\n");
    for (id, balance) in snapshot {
        reply.push_str(&format!("Account ID {id}: ${:.2}\n", balance));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        Ledger::new()
    }

    fn control() -> ServerControl {
        ServerControl::new()
    }

    #[test]
    fn create_two_accounts_yields_increasing_ids() {
        let ledger = ledger();
        let control = control();
        assert_eq!(
            execute("CREATE", &ledger, &control, Duration::ZERO),
            "SUCCESS CREATE 0\n"
        );
        assert_eq!(
            execute("CREATE", &ledger, &control, Duration::ZERO),
            "SUCCESS CREATE 1\n"
        );
    }

    #[test]
    fn deposit_then_balance_scenario() {
        let ledger = ledger();
        let control = control();
        execute("CREATE", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("DEPOSIT 0 100.00", &ledger, &control, Duration::ZERO),
            "SUCCESS DEPOSIT 100.00\n"
        );
        assert_eq!(
            execute("BALANCE 0", &ledger, &control, Duration::ZERO),
            "SUCCESS BALANCE 100.00\n"
        );
    }

    #[test]
    fn withdraw_beyond_balance_fails_and_balance_is_unaffected() {
        let ledger = ledger();
        let control = control();
        execute("CREATE", &ledger, &control, Duration::ZERO);
        execute("DEPOSIT 0 100.00", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("WITHDRAW 0 150.00", &ledger, &control, Duration::ZERO),
            "FAILURE WITHDRAW -1\n"
        );
        assert_eq!(
            execute("BALANCE 0", &ledger, &control, Duration::ZERO),
            "SUCCESS BALANCE 100.00\n"
        );
    }

    #[test]
    fn transfer_scenario() {
        let ledger = ledger();
        let control = control();
        execute("CREATE", &ledger, &control, Duration::ZERO);
        execute("CREATE", &ledger, &control, Duration::ZERO);
        execute("DEPOSIT 0 100.00", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("TRANSFER 0 1 40.00", &ledger, &control, Duration::ZERO),
            "SUCCESS TRANSFER 60.00\n"
        );
        assert_eq!(
            execute("BALANCE 1", &ledger, &control, Duration::ZERO),
            "SUCCESS BALANCE 40.00\n"
        );
    }

    #[test]
    fn transfer_to_self_fails() {
        let ledger = ledger();
        let control = control();
        execute("CREATE", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("TRANSFER 0 0 10.00", &ledger, &control, Duration::ZERO),
            "FAILURE TRANSFER -1\n"
        );
    }

    #[test]
    fn unknown_and_malformed_commands_are_invalid() {
        let ledger = ledger();
        let control = control();
        assert_eq!(
            execute("FROBNICATE", &ledger, &control, Duration::ZERO),
            "FAILURE INVALID -1\n"
        );
        assert_eq!(
            execute("DEPOSIT notanumber", &ledger, &control, Duration::ZERO),
            "FAILURE INVALID -1\n"
        );
    }

    #[test]
    fn balance_all_empty_ledger() {
        let ledger = ledger();
        let control = control();
        assert_eq!(
            execute("BALANCE_ALL", &ledger, &control, Duration::ZERO),
            "No accounts found.\n"
        );
    }

    #[test]
    fn balance_all_lists_accounts_in_ascending_id_order() {
        let ledger = ledger();
        let control = control();
        execute("CREATE", &ledger, &control, Duration::ZERO);
        execute("CREATE", &ledger, &control, Duration::ZERO);
        execute("DEPOSIT 0 10.00", &ledger, &control, Duration::ZERO);
        execute("DEPOSIT 1 20.00", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("BALANCE_ALL", &ledger, &control, Duration::ZERO),
            "--- All Account Balances ---\nAccount ID 0: $10.00\nAccount ID 1: $20.00\n"
        );
    }

    #[test]
    fn mode_switch_round_trips_through_mode_status() {
        let ledger = ledger();
        let control = control();
        assert_eq!(
            execute("MODE_STATUS", &ledger, &control, Duration::ZERO),
            "SUCCESS MODE_STATUS multi\n"
        );
        execute("MODE_SINGLE", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("MODE_STATUS", &ledger, &control, Duration::ZERO),
            "SUCCESS MODE_STATUS single\n"
        );
        execute("MODE_MULTI", &ledger, &control, Duration::ZERO);
        assert_eq!(
            execute("MODE_STATUS", &ledger, &control, Duration::ZERO),
            "SUCCESS MODE_STATUS multi\n"
        );
    }

    #[test]
    fn shutdown_replies_and_flips_running_flag() {
        let ledger = ledger();
        let control = control();
        assert_eq!(
            execute("SHUTDOWN", &ledger, &control, Duration::ZERO),
            "SUCCESS SHUTDOWN\n"
        );
        assert!(!control.is_running());
    }

    #[test]
    fn control_plane_commands_skip_the_simulated_delay() {
        use std::time::Instant;
        let ledger = ledger();
        let control = control();
        let long_delay = Duration::from_secs(5);
        let start = Instant::now();
        execute("MODE_STATUS", &ledger, &control, long_delay);
        execute("SHUTDOWN", &ledger, &control, long_delay);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
