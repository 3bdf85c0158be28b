use breadboard::{derive, expr, table};

fn main() {
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .unwrap();

    let text = std::env::args().nth(1).unwrap_or_else(|| "A.B + !C".to_string());

    let circuit = match expr::compile(&text) {
        Ok(circuit) => circuit,
        Err(err) => {
            eprintln!("{text}: {err}");
            std::process::exit(1);
        }
    };

    print!("{circuit}");
    for (sink, expression) in derive::expressions(&circuit) {
        println!("S{sink} = {expression}");
    }
    print!("{}", table::generate(&circuit).expect("compiled circuits have both terminals"));
}
