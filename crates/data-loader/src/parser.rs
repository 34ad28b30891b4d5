//! Parsers for the MovieLens 100k data files.
//!
//! - `u.user`: userId|age|gender|occupation|zipcode
//! - `u.item`: movieId|title|release|video release|url|19 genre flags
//! - `u.data`: userId \t movieId \t rating \t timestamp
//!
//! Every parser reports the 1-based line number of the first bad line.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Number of leading `u.item` columns before the genre flags
const ITEM_FIXED_COLUMNS: usize = 5;

/// Read a file with ISO-8859-1 encoding (Latin-1)
///
/// MovieLens titles contain Latin-1 accented characters, so the bytes are
/// mapped one-to-one onto Unicode code points instead of decoded as UTF-8.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Parse one numeric field, attaching file/line context on failure
fn parse_field<T>(value: &str, file: &str, line: usize, field: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", field, e),
    })
}

/// Split a line and make sure it has at least `expected` fields
fn split_fields<'a>(
    line: &'a str,
    sep: char,
    expected: usize,
    file: &str,
    line_no: usize,
) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = line.split(sep).collect();
    if parts.len() < expected {
        return Err(DataLoadError::FieldCountMismatch {
            file: file.to_string(),
            expected,
            found: parts.len(),
            line: line_no,
        });
    }
    Ok(parts)
}

/// Non-empty lines, paired with their 1-based line number
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn parse_gender(s: &str) -> Result<Gender> {
    s.parse().map_err(|_| DataLoadError::InvalidValue {
        field: "gender".to_string(),
        value: s.to_string(),
    })
}

/// Parse the `u.user` file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let lines = read_lines_latin1(path)?;
    parse_user_lines(&lines)
}

pub(crate) fn parse_user_lines(lines: &[String]) -> Result<Vec<User>> {
    const FILE: &str = "u.user";
    let mut users = Vec::new();

    for (line_no, line) in data_lines(lines) {
        // The zipcode column is optional; four fields are enough
        let parts = split_fields(line, '|', 4, FILE, line_no)?;

        let zipcode = parts
            .get(4)
            .map(|z| z.trim())
            .filter(|z| !z.is_empty())
            .map(str::to_string);

        users.push(User {
            id: parse_field(parts[0], FILE, line_no, "userId")?,
            age: parse_field(parts[1], FILE, line_no, "age")?,
            gender: parse_gender(parts[2])?,
            occupation: parts[3].trim().to_string(),
            zipcode,
        });
    }

    Ok(users)
}

/// Parse the `u.item` file
///
/// The title often includes the year in parentheses ("Toy Story (1995)").
/// Genre membership is a run of 0/1 flags starting at column 5.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let lines = read_lines_latin1(path)?;
    parse_movie_lines(&lines)
}

pub(crate) fn parse_movie_lines(lines: &[String]) -> Result<Vec<Movie>> {
    const FILE: &str = "u.item";
    let mut movies = Vec::new();

    for (line_no, line) in data_lines(lines) {
        let parts = split_fields(line, '|', ITEM_FIXED_COLUMNS + 1, FILE, line_no)?;

        movies.push(Movie {
            id: parse_field(parts[0], FILE, line_no, "movieId")?,
            title: parts[1].to_string(),
            genres: parse_genre_flags(&parts[ITEM_FIXED_COLUMNS..], line_no)?,
        });
    }

    Ok(movies)
}

/// Parse the `u.data` file
///
/// The canonical separator is a tab; any run of whitespace is accepted.
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let lines = read_lines_latin1(path)?;
    parse_rating_lines(&lines)
}

pub(crate) fn parse_rating_lines(lines: &[String]) -> Result<Vec<Rating>> {
    const FILE: &str = "u.data";
    let mut ratings = Vec::new();

    for (line_no, line) in data_lines(lines) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(DataLoadError::FieldCountMismatch {
                file: FILE.to_string(),
                expected: 4,
                found: parts.len(),
                line: line_no,
            });
        }

        ratings.push(Rating {
            user_id: parse_field(parts[0], FILE, line_no, "userId")?,
            movie_id: parse_field(parts[1], FILE, line_no, "movieId")?,
            rating: parse_field(parts[2], FILE, line_no, "rating")?,
            timestamp: parse_field(parts[3], FILE, line_no, "timestamp")?,
        });
    }

    Ok(ratings)
}

/// Turn the 0/1 genre flag columns into a genre list
///
/// Example: ["0", "1", "0", "1"] -> vec![Genre::Action, Genre::Animation]
fn parse_genre_flags(flags: &[&str], line_no: usize) -> Result<Vec<Genre>> {
    let mut genres = Vec::new();
    for (index, flag) in flags.iter().enumerate() {
        match flag.trim() {
            "1" => genres.push(Genre::from_flag_index(index)),
            "0" | "" => {}
            other => {
                return Err(DataLoadError::ParseError {
                    file: "u.item".to_string(),
                    line: line_no,
                    reason: format!("Invalid genre flag '{}' in column {}", other, index),
                })
            }
        }
    }
    Ok(genres)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_user_lines() {
        let users = parse_user_lines(&lines(&[
            "1|24|M|technician|85711",
            "",
            "2|53|F|other|",
        ]))
        .unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].age, 24);
        assert_eq!(users[0].gender, Gender::Male);
        assert_eq!(users[0].zipcode.as_deref(), Some("85711"));
        assert_eq!(users[1].gender, Gender::Female);
        assert_eq!(users[1].occupation, "other");
        assert!(users[1].zipcode.is_none());
    }

    #[test]
    fn test_parse_user_bad_gender() {
        let err = parse_user_lines(&lines(&["1|24|X|technician|85711"])).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_movie_lines() {
        let movies = parse_movie_lines(&lines(&[
            "1|Toy Story (1995)|01-Jan-1995||http://x|0|0|0|1|1|1|0|0|0|0|0|0|0|0|0|0|0|0|0",
            "267|unknown||||1|0|0|0|0|0|0|0|0|0|0|0|0|0|0|0|0|0|0",
        ]))
        .unwrap();

        assert_eq!(movies[0].title, "Toy Story (1995)");
        assert_eq!(
            movies[0].genres,
            vec![Genre::Animation, Genre::Children, Genre::Comedy]
        );
        assert_eq!(movies[1].genres, vec![Genre::Unknown]);
    }

    #[test]
    fn test_parse_movie_bad_flag() {
        let err = parse_movie_lines(&lines(&["1|Toy Story (1995)|||x|0|2"])).unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_rating_lines() {
        let ratings = parse_rating_lines(&lines(&["196\t242\t3\t881250949", "186 302 3.5 891717742"]))
            .unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].user_id, 196);
        assert_eq!(ratings[0].movie_id, 242);
        assert_eq!(ratings[0].rating, 3.0);
        assert_eq!(ratings[1].rating, 3.5);
        assert_eq!(ratings[1].timestamp, 891717742);
    }

    #[test]
    fn test_parse_rating_reports_line_number() {
        let err = parse_rating_lines(&lines(&["1\t2\t3\t4", "1\t2\tfive\t4"])).unwrap_err();
        match err {
            DataLoadError::ParseError { line, file, .. } => {
                assert_eq!(line, 2);
                assert_eq!(file, "u.data");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rating_missing_fields() {
        let err = parse_rating_lines(&lines(&["1\t2\t3"])).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch { expected: 4, found: 3, .. }
        ));
    }
}
