//! Builds the vesica piscis, prints it, and steps through it.
//!
//! Run with `RUST_LOG=debug` to see every stored element.

use std::process;

use log::{LevelFilter, error, info};

use straightedge::{
    ConstructionError, Frame, Model, Presenter, config::load_config, report,
};

/// Prints the element revealed at each step.
struct Printer {
    labels: Vec<String>,
}

impl Presenter for Printer {
    fn present(&mut self, frame: &Frame) {
        match frame.current() {
            Some(index) => println!("step {index}: {}", self.labels[index]),
            None => println!("(blank)"),
        }
    }
}

fn run() -> Result<(), ConstructionError> {
    let config = load_config(None::<&str>)?;
    let mut model = Model::with_config("vesica", &config);

    let a = model.set_point(0, 0, &["given"])?.element;
    let b = model.set_point(1, 0, &["given"])?.element;
    model.construct_line(a, b)?;
    model.construct_circle(a, b)?;
    model.construct_circle(b, a)?;
    model.construct_perpendicular_bisector(a, b)?;

    println!("{}", report::summary(model.store()));
    print!("{}", report::sequence_report(model.store())?);

    let labels = model
        .store()
        .iter()
        .map(|(_, _, details)| details.label().to_string())
        .collect();
    let mut sequencer = model.sequencer()?.with_presenter(Printer { labels });
    sequencer.replay();

    let e = model.element_by_label("E")?;
    let ancestors: Vec<String> = model
        .ancestor_labels(e)?
        .iter()
        .map(ToString::to_string)
        .collect();
    info!(ancestors:? = ancestors; "Lineage of E");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(err) = run() {
        error!("{err}");
        process::exit(1);
    }
}
