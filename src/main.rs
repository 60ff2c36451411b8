use clap::{arg,crate_version,Command};
use quadpress::{wb,STD_OPTIONS};
use std::path::Path;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        return ans.trim_end()=="y" || ans.trim_end()=="Y";
    }
    true
}

/// container path with its extension changed to `sym`
fn sibling_sym(container: &str) -> String {
    Path::new(container).with_extension("sym").to_string_lossy().into_owned()
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `quadpress compress -i page.qd -o page.wb`
Expand:        `quadpress expand -i page.wb -o page.qd`

The symbol table travels beside the container; when --sym is omitted the
path is the container path with its extension changed to `sym`.";

    let mut main_cmd = Command::new("quadpress")
        .about("Compress and expand whiteboard quadtrees")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "textual tree path").required(true))
        .arg(arg!(-o --output <PATH> "container path").required(true))
        .arg(arg!(-s --sym <PATH> "symbol table path"))
        .about("compress a textual quadtree into a binary container"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "container path").required(true))
        .arg(arg!(-o --output <PATH> "textual tree path").required(true))
        .arg(arg!(-s --sym <PATH> "symbol table path"))
        .about("expand a binary container into a textual quadtree"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let path_sym = match cmd.get_one::<String>("sym") {
            Some(s) => s.clone(),
            None => sibling_sym(path_out)
        };
        if !ok_to_overwrite(path_out) || !ok_to_overwrite(&path_sym) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let mut sym_file = std::fs::File::create(&path_sym)?;
        let (in_size,out_size) = wb::compress(&mut in_file,&mut out_file,&mut sym_file,&STD_OPTIONS)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let path_sym = match cmd.get_one::<String>("sym") {
            Some(s) => s.clone(),
            None => sibling_sym(path_in)
        };
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut sym_file = std::fs::File::open(&path_sym)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let (in_size,out_size) = wb::expand(&mut in_file,&mut sym_file,&mut out_file,&STD_OPTIONS)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    Ok(())
}
