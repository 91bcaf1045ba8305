//! Line state machine for the solution text format.

use tracing::{debug, warn};

use super::project::SolutionProject;
use super::section::GlobalSection;
use super::version::SolutionVersion;
use super::{Preamble, Solution};
use crate::domain::error::DomainError;

const GLOBAL: &str = "Global";
const END_GLOBAL: &str = "EndGlobal";
const PROJECT: &str = "Project";
const END_PROJECT: &str = "EndProject";
const GLOBAL_SECTION: &str = "GlobalSection";
const END_GLOBAL_SECTION: &str = "EndGlobalSection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    NormalRead,
    ReadProject,
    LookForGlobalSection,
    ReadSection,
}

struct SolutionReader<'a> {
    solution: &'a mut Solution,
    state: ReadState,
    /// Set right after a format line, until the comment line is seen.
    awaiting_comment: bool,
    global_seen: bool,
}

impl SolutionReader<'_> {
    fn read(&mut self, line: &str, line_number: usize) -> Result<(), DomainError> {
        self.state = match self.state {
            ReadState::NormalRead => self.normal_read(line, line_number)?,
            ReadState::ReadProject => self.read_project(line),
            ReadState::LookForGlobalSection => self.look_for_global_section(line),
            ReadState::ReadSection => self.read_section(line),
        };
        Ok(())
    }

    fn normal_read(&mut self, line: &str, line_number: usize) -> Result<ReadState, DomainError> {
        if line.starts_with(GLOBAL) {
            self.awaiting_comment = false;
            self.global_seen = true;
            return Ok(ReadState::LookForGlobalSection);
        }

        if line.starts_with(PROJECT) {
            self.awaiting_comment = false;
            let project = SolutionProject::from_header(line, line_number)?;
            self.solution.projects.push(project);
            return Ok(ReadState::ReadProject);
        }

        let trimmed = line.trim();

        if self.awaiting_comment {
            self.awaiting_comment = false;
            if trimmed.starts_with('#') {
                if let Some(preamble) = &mut self.solution.preamble {
                    preamble.version = preamble.version.refine(trimmed);
                    preamble.comment_line = Some(line.to_owned());
                }
                return Ok(ReadState::NormalRead);
            }
        }

        if self.solution.preamble.is_none() {
            if let Some(version) = SolutionVersion::from_format_line(trimmed) {
                debug!(%version, "solution format recognized");
                self.solution.preamble = Some(Preamble {
                    version,
                    format_line: line.to_owned(),
                    comment_line: None,
                });
                self.awaiting_comment = true;
                return Ok(ReadState::NormalRead);
            }
        }

        self.keep_unrecognized(line);
        Ok(ReadState::NormalRead)
    }

    fn read_project(&mut self, line: &str) -> ReadState {
        let Some(project) = self.solution.projects.last_mut() else {
            return ReadState::NormalRead;
        };
        if line.starts_with(END_PROJECT) {
            project.set_footer(line);
            ReadState::NormalRead
        } else {
            project.read_line(line);
            ReadState::ReadProject
        }
    }

    fn look_for_global_section(&mut self, line: &str) -> ReadState {
        let trimmed = line.trim();
        if trimmed.starts_with(GLOBAL_SECTION) {
            self.solution.sections.push(GlobalSection::from_header(line));
            return ReadState::ReadSection;
        }
        if trimmed == END_GLOBAL {
            return ReadState::NormalRead;
        }
        match self.solution.sections.last_mut() {
            Some(section) => section.trailer.push(line.to_owned()),
            None => self.solution.global_leading.push(line.to_owned()),
        }
        ReadState::LookForGlobalSection
    }

    fn read_section(&mut self, line: &str) -> ReadState {
        let Some(section) = self.solution.sections.last_mut() else {
            return ReadState::LookForGlobalSection;
        };
        if line.trim() == END_GLOBAL_SECTION {
            section.set_footer(line);
            ReadState::LookForGlobalSection
        } else {
            section.read(line);
            ReadState::ReadSection
        }
    }

    /// Top-level lines outside any block stay where they were found.
    fn keep_unrecognized(&mut self, line: &str) {
        let target = if self.global_seen {
            &mut self.solution.trailing_lines
        } else if let Some(project) = self.solution.projects.last_mut() {
            &mut project.trailer
        } else if self.solution.preamble.is_some() {
            &mut self.solution.header_lines
        } else {
            &mut self.solution.leading_lines
        };
        target.push(line.to_owned());
    }
}

/// Feed every line of `text` through the state machine. End of input is
/// accepted in any state.
pub(super) fn read_into(solution: &mut Solution, text: &str) -> Result<(), DomainError> {
    let mut reader = SolutionReader {
        solution,
        state: ReadState::NormalRead,
        awaiting_comment: false,
        global_seen: false,
    };

    for (index, line) in text.lines().enumerate() {
        reader.read(line, index + 1)?;
    }

    if reader.solution.preamble.is_none() {
        warn!(
            file = %reader.solution.filename.display(),
            "unrecognized solution format; preamble kept verbatim"
        );
    }
    Ok(())
}
