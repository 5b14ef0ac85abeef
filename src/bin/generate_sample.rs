use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Mean scores per outcome: (IQ, english, technical, soft skills, gpa).
fn outcome_profile(outcome: &str) -> (f64, f64, f64, f64, f64) {
    match outcome {
        "Accepted" => (108.0, 78.0, 80.0, 75.0, 3.3),
        "pending" => (100.0, 65.0, 62.0, 60.0, 2.7),
        _ => (95.0, 52.0, 45.0, 48.0, 1.9),
    }
}

fn clamp_score(v: f64) -> f64 {
    (v.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let outcomes = ["Accepted", "pending", "drop out"];
    let aid_levels = ["none", "partial", "full"];
    let english_levels = ["beginner", "intermediate", "advanced"];
    let employment = ["unemployed", "part-time", "full-time", "student"];

    let output_path = "processed_student_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "student_id",
        "IQ_test_score",
        "English_test_score",
        "technical_test_score",
        "Soft_skills_Score",
        "gpa",
        "Result",
        "financial_aid",
        "english_level",
        "current_employment_status",
    ])?;

    let n_students = 300;
    for i in 0..n_students {
        // Roughly 45% accepted, 25% pending, 30% drop out.
        let roll = rng.next_f64();
        let outcome = if roll < 0.45 {
            "Accepted"
        } else if roll < 0.70 {
            "pending"
        } else {
            "drop out"
        };
        let (iq_mu, english_mu, technical_mu, soft_mu, gpa_mu) = outcome_profile(outcome);

        let iq = clamp_score(rng.gauss(iq_mu, 10.0).min(100.0));
        let english = clamp_score(rng.gauss(english_mu, 12.0));
        let technical = clamp_score(rng.gauss(technical_mu, 14.0));
        let soft = clamp_score(rng.gauss(soft_mu, 12.0));
        let gpa = (rng.gauss(gpa_mu, 0.4).clamp(0.0, 4.0) * 100.0).round() / 100.0;

        // A few rows with missing cells, to exercise undefined metrics.
        let drop_score = rng.next_f64() < 0.03;
        let drop_gpa = rng.next_f64() < 0.02;

        let cell = |v: f64, dropped: bool| {
            if dropped {
                String::new()
            } else {
                v.to_string()
            }
        };

        writer.write_record([
            format!("S{:04}", i + 1),
            cell(iq, false),
            cell(english, drop_score),
            cell(technical, false),
            cell(soft, false),
            cell(gpa, drop_gpa),
            outcome.to_string(),
            rng.pick(&aid_levels).to_string(),
            rng.pick(&english_levels).to_string(),
            rng.pick(&employment).to_string(),
        ])?;
    }

    writer.flush().context("flushing CSV")?;
    println!("Wrote {n_students} students to {output_path}");
    Ok(())
}
