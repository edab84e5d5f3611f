use nucleotide_aligner::{Aligner, AlignmentMode, ScoringScheme};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let seq1 = b"ACGTACGT";
    let seq2 = b"ACGTAGCT";

    for mode in [AlignmentMode::Global, AlignmentMode::FrameFit] {
        let aligner = Aligner::new();
        println!("== {}", mode);
        match mode {
            AlignmentMode::Global => {
                let result = aligner.align(seq1, seq2)?;
                println!("{}", result);
                println!("Operations: {:?}", result.operations);
            }
            AlignmentMode::FrameFit => {
                let result = aligner.align_to_frame(b"ACGTGT", seq2)?;
                println!("Fitted: {} (score {})", result, result.score);
            }
        }
    }

    // Cheaper gap opening shifts the optimum towards gapped layouts
    let relaxed = Aligner::new().with_scoring(ScoringScheme::new(2, -1, -2, -3, -1)?)?;
    let result = relaxed.align(b"ACGTTTTACGTA", b"ACGTACGTA")?;
    println!("== relaxed gaps\n{}\ncigar: {}", result, result.cigar());

    Ok(())
}
