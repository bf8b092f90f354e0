#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The problem as given by the user, i.e. unscaled and
// with no internal solver state.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub l: Vec<T>,
    pub u: Vec<T>,
    pub settings: DefaultSettings<T>,
}

impl<T> Solver<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the unscaled problem data and the settings to a JSON file
    pub fn save_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let data = &self.workspace.data;
        let mut json_data = JsonProblemData {
            P: data.P.clone(),
            q: data.q.clone(),
            A: data.A.clone(),
            l: data.l.clone(),
            u: data.u.clone(),
            settings: self.settings.clone(),
        };

        // restore scaling to original
        let equil = &data.equilibration;
        let dinv = &equil.dinv;
        let einv = &equil.einv;

        json_data.P.lrscale(dinv, dinv);
        json_data.P.scale(equil.cinv);
        json_data.q.hadamard(dinv).scale(equil.cinv);

        json_data.A.lrscale(einv, dinv);
        json_data.l.hadamard(einv);
        json_data.u.hadamard(einv);

        // sanitize settings to remove values that
        // can't be serialized, i.e. infs
        sanitize_settings(&mut json_data.settings);

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Create a solver from a file written by
    /// [`save_to_file`](Self::save_to_file), optionally with new settings
    pub fn load_from_file(
        file: &mut File,
        settings: Option<DefaultSettings<T>>,
    ) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        // restore sanitized settings to their (likely) original values
        desanitize_settings(&mut json_data.settings);

        let settings = settings.unwrap_or(json_data.settings);
        let (P, A) = (&json_data.P, &json_data.A);
        let (q, l, u) = (&json_data.q, &json_data.l, &json_data.u);

        Self::new(P, q, A, l, u, settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn sanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::INFINITY {
        settings.time_limit = f64::MAX;
    }
}

fn desanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::MAX {
        settings.time_limit = f64::INFINITY;
    }
}

#[test]
fn test_json_io() {
    use std::io::{Seek, SeekFrom};

    let P = CscMatrix::from(&[[2.0, 0.5], [0.0, 1.0]]);
    let q = [1.0, -1.0];
    let A = CscMatrix::from(&[[1.0, 1.0], [1.0, 0.0]]);
    let l = [1.0, -f64::INFINITY];
    let u = [1.0, 0.3];

    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = Solver::<f64>::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    let mut file = tempfile::tempfile().unwrap();
    solver.save_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = Solver::<f64>::load_from_file(&mut file, None).unwrap();
    assert_eq!(solver2.settings.time_limit, f64::INFINITY);
    assert!(solver2.workspace.data.q.norm_inf_diff(&solver.workspace.data.q) < 1e-12);
    solver2.solve();
    assert_eq!(solver2.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.norm_inf_diff(&solver2.solution.x) < 1e-10);
}
