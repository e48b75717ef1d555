use trigon_engine::core::App;
use trigon_engine::gfx::Gfx;

/// Opens the window and presents until it is closed. Draws nothing.
#[derive(Debug, Default)]
pub struct HelloWindow;

impl<G: Gfx> App<G> for HelloWindow {}

/// Same as [`HelloWindow`]; the exit key and the clear come from its
/// frame configuration.
#[derive(Debug, Default)]
pub struct InputWindow;

impl<G: Gfx> App<G> for InputWindow {}
