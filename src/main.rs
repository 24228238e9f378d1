mod app;
mod dataset;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "data/demo.json")]
    dataset: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "linkview",
        options,
        Box::new(move |cc| Ok(Box::new(app::LinkViewApp::new(cc, args.dataset.clone())))),
    )
}
