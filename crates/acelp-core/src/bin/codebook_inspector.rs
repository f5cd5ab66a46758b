//! AMR-NB innovation index inspector
//!
//! Decodes the packed codebook index words of one subframe back into pulse
//! positions and signs. Without index words it runs a search on a synthetic
//! subframe and prints what the encoder would transmit.

use acelp_core::{search_codebook, unpack, Codevector, Mode, PackedIndices, SearchInput};

const L_CODE: usize = 40;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <mode> <subframe> [index words...]", program);
    eprintln!("Example: {} MR102 0 0 1 1 1 963 20 3", program);
    eprintln!("Example: {} 12200 2", program);
    eprintln!();
    eprintln!("Modes: MR475 MR515 MR59 MR67 MR74 MR795 MR102 MR122 (or a bit-rate)");
    std::process::exit(1);
}

fn print_codevector(codevector: &Codevector) {
    println!("Pulses ({}):", codevector.len());
    for (slot, pulse) in codevector.pulses().iter().enumerate() {
        let sign = if pulse.sign.is_positive() { '+' } else { '-' };
        println!("  slot {:2}: position {:2} sign {}", slot, pulse.position, sign);
    }

    let mut lane = ['.'; L_CODE];
    for pulse in codevector.pulses() {
        lane[pulse.position] = match (lane[pulse.position], pulse.sign.is_positive()) {
            ('.', true) => '+',
            ('.', false) => '-',
            _ => '2',
        };
    }
    println!("  |{}|", lane.iter().collect::<String>());
}

fn demo_search(mode: Mode, subframe: usize) -> acelp_core::Result<()> {
    let mut target = [0i16; L_CODE];
    let mut h = [0i16; L_CODE];
    for n in 0..L_CODE {
        let t = n as f64;
        target[n] = (2500.0 * (t * 0.45).sin() + 900.0 * (t * 1.3).cos()) as i16;
        h[n] = (4096.0 * 0.85f64.powi(n as i32) * (t * 0.7).cos()) as i16;
    }

    println!("Demo search on a synthetic subframe");
    let input = SearchInput::new(&target)
        .with_residual(&target)
        .with_subframe(subframe)
        .with_pitch(L_CODE as i16, 0);
    let out = search_codebook(mode, &input, &mut h)?;

    print_codevector(&out.codevector);
    println!("Index words: {:?}", out.indices.words());
    if out.overflow {
        println!("Note: arithmetic saturated during the search");
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let mode: Mode = match args[1].parse() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let subframe: usize = match args[2].parse() {
        Ok(subframe) => subframe,
        Err(_) => {
            eprintln!("Error: subframe '{}' is not a number", args[2]);
            std::process::exit(1);
        }
    };

    println!("AMR-NB Codebook Inspector");
    println!("=========================");
    println!("Mode: {} ({} bps, {})", mode, mode.bitrate(), mode.variant());
    println!("Subframe: {}", subframe);
    println!();

    if args.len() == 3 {
        if let Err(e) = demo_search(mode, subframe) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let mut words = Vec::with_capacity(args.len() - 3);
    for arg in &args[3..] {
        match arg.parse::<i16>() {
            Ok(word) => words.push(word),
            Err(_) => {
                eprintln!("Error: index word '{}' is not a 16-bit integer", arg);
                std::process::exit(1);
            }
        }
    }

    let decoded = PackedIndices::new(mode, words).and_then(|packed| unpack(&packed, subframe));
    match decoded {
        Ok(codevector) => print_codevector(&codevector),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
