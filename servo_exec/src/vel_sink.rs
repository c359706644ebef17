//! # Velocity sinks
//!
//! A sink delivers velocity commands to the base actuators. The control loop
//! doesn't wait for, or expect, any response from the actuators.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::io::Write;

use comms_if::eqpt::vel::VelocityCommand;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can deliver velocity commands to the actuators.
pub trait VelocitySink {
    /// Send a single command.
    fn send(&mut self, cmd: &VelocityCommand) -> Result<(), SinkError>;

    /// Make sure all sent commands have been delivered.
    fn flush(&mut self) -> Result<(), SinkError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Writes each command as a line of JSON, e.g. `{"linear":0.5,"angular":0.0}`.
pub struct JsonLineSink<W: Write> {
    writer: W,
}

/// Keeps every command sent, in order.
#[derive(Default, Debug, Clone)]
pub struct RecordingSink {
    /// The commands sent so far
    pub cmds: Vec<VelocityCommand>,

    /// Number of times the sink was flushed
    pub num_flushes: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not write the command: {0}")]
    WriteError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<W: Write> JsonLineSink<W> {
    /// Create a new sink writing to the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> VelocitySink for JsonLineSink<W> {
    fn send(&mut self, cmd: &VelocityCommand) -> Result<(), SinkError> {
        let line = serde_json::to_string(cmd).map_err(SinkError::SerializationError)?;
        writeln!(self.writer, "{}", line).map_err(SinkError::WriteError)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(SinkError::WriteError)
    }
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VelocitySink for RecordingSink {
    fn send(&mut self, cmd: &VelocityCommand) -> Result<(), SinkError> {
        self.cmds.push(*cmd);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.num_flushes += 1;
        Ok(())
    }
}

impl<S: VelocitySink + ?Sized> VelocitySink for Box<S> {
    fn send(&mut self, cmd: &VelocityCommand) -> Result<(), SinkError> {
        (**self).send(cmd)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
