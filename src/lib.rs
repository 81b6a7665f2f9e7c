/*

Editing round trip for a file with two chapters:

  ;FFMETADATA1            Intro    0:00
  [CHAPTER]               Part 2   0:30
  TIMEBASE=1/1000
  START=0           -->   (user edits)   -->   ;FFMETADATA1
  END=30000                                    [CHAPTER] ... END=<next start>
  title=Intro                                  [CHAPTER] ... END=<duration>
  ...

*/

pub mod chapters;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod ffmetadata;
pub mod temp;
pub mod tools;
pub mod workflow;

pub use chapters::{Chapter, EditedChapter};
pub use config::Config;
pub use error::{ChapterError, Result};
pub use workflow::ChapterEditor;
