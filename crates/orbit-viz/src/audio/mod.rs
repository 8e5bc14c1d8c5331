mod media;
mod source_pipe;

pub use source_pipe::SourcePipe;
