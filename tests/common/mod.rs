//! Shared campaign fixture for integration tests
//!
//! Builds a complete miniature campaign on disk: a four-node mesh, a
//! control file recording two elevation stations, a baseline fort.13, two
//! land-use basis directories, and fake solver executables.

// not every test binary uses every fixture piece
#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tiderun::adapters::grid::fort13::write_manning_field;
use tiderun::config::TiderunConfig;

pub const FORT14: &str = "\
ensemble test mesh
2 4
1 0.0 0.0 1.0
2 1.0 0.0 2.0
3 0.0 1.0 3.0
4 1.0 1.0 4.0
1 3 1 2 3
2 3 2 4 3
";

pub const FORT15: &str = "\
ensemble test run                       ! RUNDES
manning sweep                           ! RUNID
2.0                                     ! DT
2.0                                     ! RNDAY
1 0.0 2.0 43200                         ! NOUTE, TOUTSE, TOUTFE, NSPOOLE
2                                       ! NSTAE
0.25 0.25                               ! inner station
0.75 0.75                               ! outer station
0 0.0 0.0 0                             ! NOUTGE, TOUTSGE, TOUTFGE, NSPOOLGE
";

/// padcirc stand-in writing fort.61 (2 stations x 2 records) and a
/// four-node maxele.63 into its run directory
pub const FAKE_PADCIRC: &str = "#!/bin/sh
cat > fort.61 <<'EOF'
elevation
2 2 86400.0 43200 1
86400.0 43200
1 0.50
2 -99999.0
172800.0 86400
1 0.75
2 0.85
EOF
cat > maxele.63 <<'EOF'
max elevation
1 4 0.0 0 1
172800.0 86400
1 1.10
2 1.20
3 -99999.0
4 1.40
EOF
exit 0
";

pub const FAKE_ADCPREP: &str = "#!/bin/sh\ncat > /dev/null\nexit 0\n";

/// A staged miniature campaign
pub struct Fixture {
    pub root: TempDir,
    pub grid_dir: PathBuf,
    pub save_dir: PathBuf,
    pub basis_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl Fixture {
    /// Builds the full fixture with the default fake solver
    pub fn new() -> Self {
        Self::with_padcirc(FAKE_PADCIRC)
    }

    /// Builds the fixture with a custom padcirc script
    pub fn with_padcirc(padcirc_script: &str) -> Self {
        let root = TempDir::new().unwrap();
        let grid_dir = root.path().join("grid");
        let save_dir = root.path().join("save");
        let basis_dir = root.path().join("basis");
        let bin_dir = root.path().join("bin");
        for dir in [&grid_dir, &save_dir, &basis_dir, &bin_dir] {
            std::fs::create_dir_all(dir).unwrap();
        }

        std::fs::write(grid_dir.join("fort.14"), FORT14).unwrap();
        std::fs::write(grid_dir.join("fort.15"), FORT15).unwrap();
        std::fs::write(grid_dir.join("fort.22"), "wind placeholder\n").unwrap();

        // baseline attributes: every node at the default
        write_manning_field(save_dir.join("fort.13"), "baseline", 0.025, &[0.025; 4]).unwrap();

        // two land classes, each fully covering half the mesh
        for (class, field) in [
            ("landuse_00", [1.0, 1.0, 0.0, 0.0]),
            ("landuse_01", [0.0, 0.0, 1.0, 1.0]),
        ] {
            let dir = basis_dir.join(class);
            std::fs::create_dir(&dir).unwrap();
            write_manning_field(dir.join("fort.13"), class, 0.0, &field).unwrap();
        }

        write_executable(&bin_dir.join("adcprep"), FAKE_ADCPREP);
        write_executable(&bin_dir.join("padcirc"), padcirc_script);

        Self {
            root,
            grid_dir,
            save_dir,
            basis_dir,
            bin_dir,
        }
    }

    /// A config pointing at this fixture, loaded through the real loader
    pub fn config(&self) -> TiderunConfig {
        let toml = format!(
            r#"
[paths]
grid_dir = "{}"
save_dir = "{}"
basis_dir = "{}"
base_dir = "{}"

[run]
concurrent_runs = 2
procs_per_job = 1
screen_output = false
cleanup = true
timeout_seconds = 60

[verification]
enable_verification = true
"#,
            self.grid_dir.display(),
            self.save_dir.display(),
            self.basis_dir.display(),
            self.bin_dir.display(),
        );
        let path = self.root.path().join("tiderun.toml");
        std::fs::write(&path, toml).unwrap();
        tiderun::config::load_config(&path).unwrap()
    }
}

fn write_executable(path: &Path, script: &str) {
    std::fs::write(path, script).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}
