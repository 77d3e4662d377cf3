use sweeper_store::GameResult;

pub const REPORT_SUBJECT: &str = "Minesweeper game results";

/// Lines shown on the end-of-game screen.
pub fn summary_lines(result: &GameResult) -> Vec<String> {
    let mut lines = vec![format!("Time: {} s", result.duration_secs)];
    if result.outcome.is_won() {
        lines.push("You won!".to_string());
        lines.push(format!("Mines found: {}", result.flagged_mines));
    } else {
        lines.push(format!(
            "Lost: {}",
            result.loss_reason.as_deref().unwrap_or_default()
        ));
        lines.push(format!("Mines found: {}", result.flagged_mines));
        lines.push(format!("Mines not found: {}", result.unrevealed_mines));
    }
    lines
}

/// Subject and body of the message a player can send about one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
}

impl Report {
    pub fn new(result: &GameResult, recipient: Option<String>) -> Self {
        let mut body = format!("Time played: {} seconds\n", result.duration_secs);
        if result.outcome.is_won() {
            body.push_str("You won!\n");
            body.push_str(&format!("Mines found: {}", result.flagged_mines));
        } else {
            body.push_str(&format!(
                "Reason for the loss: {}\n",
                result.loss_reason.as_deref().unwrap_or_default()
            ));
            body.push_str(&format!("Mines found: {}\n", result.flagged_mines));
            body.push_str(&format!("Mines not found: {}", result.unrevealed_mines));
        }

        Self {
            recipient,
            subject: REPORT_SUBJECT.to_string(),
            body,
        }
    }
}

/// Full description of a stored game for the history detail view.
pub fn detail(result: &GameResult) -> String {
    format!(
        "Date: {}\nAlias: {}\nDuration: {} seconds\nResult: {}\nMines found: {}\nMines not found: {}\nReason for the loss: {}",
        result.timestamp.format("%d/%m/%Y %H:%M"),
        result.alias,
        result.duration_secs,
        if result.outcome.is_won() {
            "Victory"
        } else {
            "Defeat"
        },
        result.flagged_mines,
        result.unrevealed_mines,
        result.loss_reason.as_deref().unwrap_or("N/A"),
    )
}
