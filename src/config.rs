//! Runtime configuration, read from flags or the environment (`.env` included).

use std::path::PathBuf;

use clap::Args;

use crate::course_stats::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// JSON file holding every grade record
    #[arg(long, env = "GRADES_PATH", default_value = "grades.json", global = true)]
    pub grades_path: PathBuf,

    /// CSV file holding the student table
    #[arg(long, env = "STUDENTS_PATH", default_value = "students.csv", global = true)]
    pub students_path: PathBuf,

    /// Records aggregated between two cooperative yields
    #[arg(long, env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grades_path: PathBuf::from("grades.json"),
            students_path: PathBuf::from("students.csv"),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
