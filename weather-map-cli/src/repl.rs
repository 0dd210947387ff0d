//! Terminal stand-in for the map widget: typed commands become UI events.

use tokio::io::{AsyncBufReadExt, BufReader};
use weather_map_core::{Config, MapDefaults, MapEvent, Resolution, Session, UiEvent};

use crate::render::render;

const HELP: &str = "\
Commands:
  click <lat> <lng>   select a point on the map
  type <text>         set the search box text
  enter               submit the search box
  search <text>       type and submit in one step
  close               close the search panel
  view                redraw the current view
  help                show this help
  quit                leave";

#[derive(Debug, PartialEq)]
enum Input {
    Events(Vec<UiEvent>),
    View,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line.trim(), ""),
    };

    let input = match word {
        "click" => {
            let mut parts = rest.split_whitespace();
            let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err("usage: click <lat> <lng>".into());
            };
            let lat: f64 = lat.parse().map_err(|_| format!("bad latitude '{lat}'"))?;
            let lng: f64 = lng.parse().map_err(|_| format!("bad longitude '{lng}'"))?;
            Input::Events(vec![UiEvent::Map(MapEvent::Click { lat, lng })])
        }
        // The query is kept verbatim, including surrounding spaces.
        "type" => Input::Events(vec![UiEvent::QueryChanged(rest.to_string())]),
        "enter" => Input::Events(vec![UiEvent::SubmitSearch]),
        "search" => Input::Events(vec![
            UiEvent::QueryChanged(rest.to_string()),
            UiEvent::SubmitSearch,
        ]),
        "close" => Input::Events(vec![UiEvent::ClosePanel]),
        "view" | "" => Input::View,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };

    Ok(input)
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let mut session = Session::from_config(config)?;
    let defaults = MapDefaults::default();

    println!(
        "Map centred on {} at zoom {} (tiles: {})",
        defaults.center, defaults.zoom, defaults.tile_url
    );
    println!("{HELP}");
    print!("{}", render(&session.view(), session.state().search_query()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                match parse_input(&line) {
                    Ok(Input::Events(events)) => {
                        for event in events {
                            session.handle(event);
                        }
                        print!("{}", render(&session.view(), session.state().search_query()));
                    }
                    Ok(Input::View) => {
                        print!("{}", render(&session.view(), session.state().search_query()));
                    }
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(Input::Quit) => break,
                    Err(msg) => tracing::warn!(input = %line, "{msg}"),
                }
            }
            Some(resolution) = session.next_update() => {
                if resolution == Resolution::Applied {
                    print!("{}", render(&session.view(), session.state().search_query()));
                }
            }
        }
    }

    Ok(())
}
