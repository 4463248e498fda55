use salmon_chess::uci::UciHandler;

fn main() -> anyhow::Result<()> {
    let mut uci = UciHandler::new();
    uci.run()
}
