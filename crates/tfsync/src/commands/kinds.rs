use super::Context;
use colored::Colorize;

pub fn handle(ctx: &Context) {
    let registry = ctx.registry();

    println!("{}", "Kinds:".bold());
    for kind in registry.kinds() {
        println!(
            "  {:<16} {}",
            kind.name().cyan(),
            kind.included_resource_types().join(", ").dimmed()
        );
    }

    println!();
    println!("{}", "Groups:".bold());
    for (name, members) in registry.groups() {
        println!("  {:<16} {}", name.cyan(), members.join(", "));
    }
}
