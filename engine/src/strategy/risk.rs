use shared::models::{Candle, Direction, TradeSetup};

/// Entry at the close, stop beyond the candle's extreme, target at
/// `reward_risk` times the risk on the other side of the entry.
pub fn build_setup(direction: Direction, candle: &Candle, reward_risk: f64) -> TradeSetup {
    let entry = candle.close;
    let (stop_loss, target) = match direction {
        Direction::Buy => {
            let stop_loss = candle.low;
            (stop_loss, entry + reward_risk * (entry - stop_loss))
        }
        Direction::Sell => {
            let stop_loss = candle.high;
            (stop_loss, entry - reward_risk * (stop_loss - entry))
        }
    };

    TradeSetup {
        direction,
        time: candle.timestamp,
        entry,
        stop_loss,
        target,
    }
}
