//! Terminal rendering.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use chrono::NaiveDate;

use barberbook_core::models::wire::TIME_FORMAT;
use barberbook_core::{Barbershop, Booking, CartEntry, Price, TimeSlot, User};
use barberbook_storefront::Notice;

/// Errors go to stderr, everything else to stdout.
pub fn notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{notice}");
    } else {
        println!("{notice}");
    }
}

pub fn shops(shops: &[Barbershop]) {
    if shops.is_empty() {
        println!("No barbershops found.");
        return;
    }
    for shop in shops {
        println!("{:<16} {:<28} {}", shop.id, shop.name, shop.address);
    }
}

pub fn shop(shop: &Barbershop) {
    println!("{} ({})", shop.name, shop.id);
    println!("  {}", shop.address);
    if !shop.phone.is_empty() {
        println!("  {}", shop.phone);
    }
    if let Some(hours) = &shop.working_hours {
        if hours.closed {
            println!("  Closed");
        } else {
            println!(
                "  Open {}-{}",
                hours.open.format(TIME_FORMAT),
                hours.close.format(TIME_FORMAT)
            );
        }
    }

    println!("\nServices:");
    for service in &shop.services {
        println!(
            "  {:<14} {:<24} {:>4} min  {}",
            service.id, service.name, service.duration, service.price
        );
    }

    println!("\nBarbers:");
    for barber in &shop.barbers {
        let specialization = barber.specialization.as_deref().unwrap_or("");
        println!("  {:<14} {:<24} {}", barber.id, barber.name, specialization);
    }
}

pub fn dates(dates: &[NaiveDate]) {
    println!("Bookable dates:");
    for date in dates {
        println!("  {}", date.format("%Y-%m-%d (%a)"));
    }
}

pub fn slots(date: NaiveDate, slots: &[&TimeSlot]) {
    if slots.is_empty() {
        println!("No open slots on {date}.");
        return;
    }
    println!("Open slots on {date}:");
    for slot in slots {
        match &slot.barber_id {
            Some(barber) => println!("  {}  ({barber})", slot.time.format(TIME_FORMAT)),
            None => println!("  {}", slot.time.format(TIME_FORMAT)),
        }
    }
}

pub fn cart_entry(entry: &CartEntry) {
    println!(
        "{}  {} at {}, {} {}{}  {}  {} min",
        entry.id,
        entry.service_name,
        entry.shop.name,
        entry.date,
        entry.time.format(TIME_FORMAT),
        entry
            .barber_name
            .as_deref()
            .map(|name| format!(" with {name}"))
            .unwrap_or_default(),
        entry.price,
        entry.duration
    );
}

pub fn cart(entries: &[CartEntry], total_price: Price, total_duration: u32) {
    if entries.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for entry in entries {
        cart_entry(entry);
    }
    println!("\nTotal: {total_price}, {total_duration} min");
}

pub fn bookings(bookings: &[Booking]) {
    if bookings.is_empty() {
        println!("No bookings.");
        return;
    }
    for booking in bookings {
        println!(
            "{:<12} {:<10} {} {}  {} at {}  {}",
            booking.id,
            booking.status,
            booking.date,
            booking.time.format(TIME_FORMAT),
            booking.service_name,
            booking.shop_name,
            booking.price
        );
    }
}

pub fn user(user: &User) {
    println!("{} <{}> {}", user.name, user.email, user.phone);
}
