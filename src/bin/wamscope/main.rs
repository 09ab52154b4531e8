//! wamscope - drive an automated oscillator through the runtime and watch it
//!
//! Run with: cargo run --bin wamscope

mod audio;
mod ui;

use color_eyre::eyre::WrapErr;
use rtrb::RingBuffer;
use wam_rt::{CurveType, EngineBuilder, EngineConfig, ParameterInfo};

use audio::{AudioHost, Params};
use ui::ScopeApp;

/// Scope samples buffered between the audio thread and the UI
const SCOPE_CAPACITY: usize = 16 * 1024;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let (controller, processor) = EngineBuilder::new()
        .config(EngineConfig::default().with_telemetry_interval(16))
        .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.2).with_label("Gain"))
        .parameter(
            ParameterInfo::new("frequency", 20.0, 5_000.0, 220.0)
                .with_label("Frequency")
                .with_units("Hz")
                .with_curve(CurveType::Exponential),
        )
        .parameter(ParameterInfo::choice("shape", ["sine", "square", "saw"], 0).with_label("Shape"))
        .parameter(ParameterInfo::boolean("mute", false).with_label("Mute"))
        .build()
        .wrap_err("failed to build engine")?;

    let params = Params::resolve(&controller)?;
    let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

    let host = AudioHost::start(processor, params, scope_tx)?;

    let mut app = ScopeApp::new(controller, params, host.clock(), host.sample_rate(), scope_rx);
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    drop(host);
    result
}
