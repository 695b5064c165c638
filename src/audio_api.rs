use crate::shared::Instrument;

// What the middle layer asks of the synth. The synth turns each of these into
// engine work; the middle layer never touches the output stream itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCommand {
    // Make sure the output context exists and is running (play, first gesture)
    Wake,

    // Release the device while the transport sits at rest
    Suspend,

    // One fire-and-forget drum hit
    Trigger(Instrument),
}
