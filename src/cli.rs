#[macro_use]
mod print;
mod command;

use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use course_grader::normalize::SelectionMode;
use course_grader::state::CourseStateService;

#[derive(Parser, Debug)]
#[command(
    name = "Course command>",
    no_binary_name = true,
    disable_version_flag = true,
    infer_subcommands = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Closes the course grader.
    Exit,
    /// Prints the title and the submission status of the page.
    Status,
    /// Prints the list of questions.
    Questions,
    /// Shows a question together with the current answer.
    Show {
        /// Id of the question to show.
        id: String,
    },
    /// Selects choices of a multiple choice question by display position.
    Select {
        /// Id of the multiple choice question.
        id: String,
        /// Display positions to select, starting at 0.
        #[arg(required = true)]
        positions: Vec<usize>,
    },
    /// Clears the selection of a multiple choice question.
    Clear {
        /// Id of the multiple choice question.
        id: String,
    },
    /// Enters the response of a short answer question.
    Respond {
        /// Id of the short answer question.
        id: String,
        /// The response text.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Grades a question. Give a question id or grade the whole page.
    Grade {
        /// Id of the question to grade.
        id: Option<String>,
    },
    /// Submits the assessment and locks the page.
    Submit {
        /// Token sent along with the submission form.
        xsrf_token: String,
    },
    /// Prints the current answers as json.
    Answers,
    /// Restores answers from json, as printed by `answers`.
    Restore {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        json: Vec<String>,
    },
    /// Puts a score vector in normal form, e.g. `normalize multiple 1 0 1`.
    Normalize {
        /// `single` or `multiple`.
        mode: SelectionMode,
        /// The scores to normalize.
        #[arg(allow_negative_numbers = true)]
        scores: Vec<f64>,
    },
}

/// The rest of `line` after `words` leading words, spacing kept.
fn rest_after(line: &str, words: usize) -> &str {
    (0..words).fold(line.trim_start(), |rest, _| {
        rest.find(char::is_whitespace).map_or("", |end| rest[end..].trim_start())
    })
}

fn parse(line: &str) -> Result<Command, String> {
    let command = CommandLine::try_parse_from(line.split_whitespace())
        .map(|c| c.command)
        .map_err(|e| e.to_string())?;
    // free text is taken from the raw line
    Ok(match command {
        Command::Respond { id, .. } => Command::Respond { id, text: vec![rest_after(line, 2).to_string()] },
        Command::Restore { .. } => Command::Restore { json: vec![rest_after(line, 1).to_string()] },
        other => other,
    })
}

pub async fn start(state: CourseStateService) {
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        course_command_prefix!();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                course_print!("Could not read command: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse(&line) {
            Ok(Command::Exit)                   => break,
            Ok(Command::Status)                 => command::status(state.clone()).await,
            Ok(Command::Questions)              => command::questions(state.clone()).await,
            Ok(Command::Show{id})               => command::show(state.clone(), &id).await,
            Ok(Command::Select{id,positions})   => command::select(state.clone(), &id, positions).await,
            Ok(Command::Clear{id})              => command::clear(state.clone(), &id).await,
            Ok(Command::Respond{id,text})       => command::respond(state.clone(), &id, &text.join(" ")).await,
            Ok(Command::Grade{id})              => command::grade(state.clone(), id).await,
            Ok(Command::Submit{xsrf_token})     => command::submit(state.clone(), &xsrf_token).await,
            Ok(Command::Answers)                => command::answers(state.clone()).await,
            Ok(Command::Restore{json})          => command::restore(state.clone(), &json.join(" ")).await,
            Ok(Command::Normalize{mode,scores}) => command::normalize(mode, &scores),
            Err(e) => println!("{}", e),
        }
    }
}
