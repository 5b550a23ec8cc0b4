//! What `clean` and `clobber` remove.
//!
//! `clean` drops intermediate output. `clobber` drops everything a build
//! produced, including files generated from `.template` sources.

use std::path::PathBuf;

use crate::context::BuildContext;
use crate::error::Result;
use crate::files::FileList;
use crate::paths;
use crate::settings::Settings;
use crate::teamcity;

pub fn clean_list(settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut list = vec![settings.root.join(teamcity::INFO_FILE)];
    list.extend(
        FileList::new(settings.path(&settings.dir.source))
            .include("**/obj")
            .resolve()?,
    );
    list.extend(
        FileList::new(settings.path(&settings.dir.test_results))
            .include("**/*")
            .resolve()?,
    );
    Ok(list)
}

/// Empty in quick mode, so a quick build keeps its previous output.
pub fn clobber_list(settings: &Settings, quick: bool) -> Result<Vec<PathBuf>> {
    if quick {
        return Ok(Vec::new());
    }

    let source = settings.path(&settings.dir.source);
    let mut list = vec![
        settings.path(&settings.dir.build),
        settings.path(&settings.dir.deploy),
    ];
    list.extend(FileList::new(&source).include("**/bin").resolve()?);
    list.extend(
        FileList::new(&source)
            .include("**/*.template")
            .resolve()?
            .iter()
            .map(|template| paths::strip_extension(template)),
    );
    Ok(list)
}

pub fn clean(ctx: &BuildContext) -> Result<usize> {
    remove_all(ctx, clean_list(&ctx.settings)?)
}

pub fn clobber(ctx: &BuildContext) -> Result<usize> {
    remove_all(ctx, clobber_list(&ctx.settings, ctx.options.quick)?)
}

fn remove_all(ctx: &BuildContext, list: Vec<PathBuf>) -> Result<usize> {
    let mut removed = 0;
    for path in list {
        if ctx.remove(&path)? {
            removed += 1;
        }
    }
    Ok(removed)
}
