use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::pipeline::PipelineError;
use rectcast_sink::ContainerReader;

/// Replays an encoded container and prints per-frame rectangle counts, the
/// text-mode equivalent of the debug viewer on the player side.
pub fn run(path: &Path) -> Result<(), PipelineError> {
    let file = File::open(path).map_err(rectcast_sink::ContainerError::Io)?;
    let mut reader = ContainerReader::new(BufReader::new(file))?;
    println!("{}: frame rate {} fps", path.display(), reader.frame_rate());

    let mut frames = 0u64;
    let mut total_rects = 0u64;
    while let Some(rects) = reader.next_frame()? {
        println!("frame {frames}: {} rects", rects.len());
        frames += 1;
        total_rects += rects.len() as u64;
    }
    println!("{frames} frames, {total_rects} rects total");
    Ok(())
}
